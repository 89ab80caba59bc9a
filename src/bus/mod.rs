/*!
Bus: CPU address-space routing and the latched interrupt signals.

Address map (CPU):
- $0000-$1FFF: 2 KiB internal RAM, mirrored modulo $0800
- $2000-$3FFF: PPU registers, mirrored modulo 8
- $4014: OAM DMA port (write starts a 256-byte copy into PPU OAM)
- $4016: controller strobe (write, both ports) / controller 1 serial read
- $4017: controller 2 serial read
- $4000-$4017 otherwise: open bus, approximated as 0
- $4020-$FFFF: cartridge space, delegated to the mapper

The Bus owns RAM, the PPU, both controllers and the inserted
cartridge; the CPU borrows the Bus per tick. Producer components raise
the pending-NMI and pending-DMA latches here and the CPU consumes them
with the read-and-clear `take_*` operations at its fixed program
points; there are no callbacks.

The `peek` path is the silent twin of `read`: it must produce the same
byte a read would without mutating any observable state, and exists
for debug/disassembly snapshots.
*/

use log::warn;

use crate::cartridge::Cartridge;
use crate::controller::Controller;
use crate::ppu::Ppu;

const RAM_SIZE: usize = 0x800;

pub struct Bus {
    ram: [u8; RAM_SIZE],
    ppu: Ppu,
    controllers: [Controller; 2],
    cartridge: Option<Cartridge>,

    nmi_pending: bool,
    dma_pending: bool,
}

impl Default for Bus {
    fn default() -> Self {
        Self::new()
    }
}

impl Bus {
    pub fn new() -> Self {
        Self {
            ram: [0; RAM_SIZE],
            ppu: Ppu::new(),
            controllers: [Controller::new(), Controller::new()],
            cartridge: None,
            nmi_pending: false,
            dma_pending: false,
        }
    }

    pub fn reset(&mut self) {
        self.ram.fill(0);
        self.ppu.reset();
        self.controllers = [Controller::new(), Controller::new()];
        self.nmi_pending = false;
        self.dma_pending = false;
        if let Some(cart) = &mut self.cartridge {
            cart.reset_mapper();
        }
    }

    pub fn insert_cartridge(&mut self, cart: Cartridge) {
        self.cartridge = Some(cart);
    }

    pub fn cartridge(&self) -> Option<&Cartridge> {
        self.cartridge.as_ref()
    }

    pub fn ppu(&self) -> &Ppu {
        &self.ppu
    }

    pub fn ppu_mut(&mut self) -> &mut Ppu {
        &mut self.ppu
    }

    pub fn controller_mut(&mut self, id: usize) -> &mut Controller {
        &mut self.controllers[id & 1]
    }

    // -------------- CPU-visible memory interface --------------

    pub fn read(&mut self, addr: u16) -> u8 {
        match addr {
            0x0000..=0x1FFF => self.ram[addr as usize % RAM_SIZE],
            0x2000..=0x3FFF => {
                let Self { ppu, cartridge, .. } = self;
                ppu.read_reg(addr, cartridge.as_ref())
            }
            0x4016 => self.controllers[0].read(),
            0x4017 => self.controllers[1].read(),
            0x4000..=0x401F => 0,
            _ => self
                .cartridge
                .as_ref()
                .map_or(0, |cart| cart.read_prg(addr)),
        }
    }

    /// Silent read: same byte as `read`, no observable side effects.
    pub fn peek(&self, addr: u16) -> u8 {
        match addr {
            0x0000..=0x1FFF => self.ram[addr as usize % RAM_SIZE],
            0x2000..=0x3FFF => self.ppu.peek_reg(addr),
            0x4016 => self.controllers[0].peek(),
            0x4017 => self.controllers[1].peek(),
            0x4000..=0x401F => 0,
            _ => self
                .cartridge
                .as_ref()
                .map_or(0, |cart| cart.read_prg(addr)),
        }
    }

    /// Little-endian word read, used for interrupt vectors.
    pub fn read_word(&mut self, addr: u16) -> u16 {
        let lo = self.read(addr) as u16;
        let hi = self.read(addr.wrapping_add(1)) as u16;
        (hi << 8) | lo
    }

    pub fn write(&mut self, addr: u16, value: u8) {
        match addr {
            0x0000..=0x1FFF => self.ram[addr as usize % RAM_SIZE] = value,
            0x2000..=0x3FFF => {
                let Self { ppu, cartridge, .. } = self;
                ppu.write_reg(addr, value, cartridge.as_mut());
            }
            0x4014 => self.oam_dma(value),
            0x4016 => {
                // The strobe drives both controller ports.
                for c in &mut self.controllers {
                    c.write_strobe(value);
                }
            }
            0x4000..=0x401F => {}
            _ => {
                if let Some(cart) = &mut self.cartridge {
                    cart.write_prg(addr, value);
                }
            }
        }
    }

    /// $4014: copy the 256-byte CPU page `value << 8` into PPU OAM and
    /// latch the DMA stall for the CPU.
    fn oam_dma(&mut self, value: u8) {
        let base = (value as u16) << 8;
        let Self {
            ram,
            ppu,
            cartridge,
            ..
        } = self;

        let span: &[u8] = if base < 0x2000 {
            // Pages are RAM-mirror aligned, so a page never straddles.
            let start = base as usize % RAM_SIZE;
            &ram[start..start + 256]
        } else if base >= 0x4020 {
            cartridge
                .as_ref()
                .map_or(&[][..], |cart| cart.read_prg_span(base, 256))
        } else {
            &[]
        };

        if span.len() == 256 {
            ppu.oam_dma(span);
        } else {
            warn!("OAM DMA from unreadable page {:#06X}", base);
        }
        self.dma_pending = true;
    }

    /// Contiguous view of `count` bytes starting at `addr`, valid for
    /// internal RAM and mapper PRG. A window that straddles a region
    /// boundary is a programmer error: logged, empty slice returned.
    pub fn read_span(&self, addr: u16, count: usize) -> &[u8] {
        match addr {
            0x0000..=0x1FFF => {
                let start = addr as usize % RAM_SIZE;
                if start + count <= RAM_SIZE {
                    &self.ram[start..start + count]
                } else {
                    warn!("read_span straddles RAM end: {:#06X}+{}", addr, count);
                    &[]
                }
            }
            0x4020..=0xFFFF => self
                .cartridge
                .as_ref()
                .map_or(&[][..], |cart| cart.read_prg_span(addr, count)),
            _ => {
                warn!("read_span in unspannable region: {:#06X}+{}", addr, count);
                &[]
            }
        }
    }

    // -------------- PPU-side CHR access --------------

    pub fn read_chr(&self, addr: u16) -> u8 {
        self.cartridge.as_ref().map_or(0, |cart| cart.read_chr(addr))
    }

    pub fn read_chr_span(&self, addr: u16, count: usize) -> &[u8] {
        self.cartridge
            .as_ref()
            .map_or(&[][..], |cart| cart.read_chr_span(addr, count))
    }

    // -------------- Clocking --------------

    /// Advance the PPU one dot and latch any NMI it raised.
    pub fn tick_ppu(&mut self) {
        let Self { ppu, cartridge, .. } = self;
        ppu.tick(cartridge.as_ref());
        if self.ppu.take_nmi_request() {
            self.nmi_pending = true;
        }
    }

    // -------------- Latched signals --------------

    pub fn trigger_nmi(&mut self) {
        self.nmi_pending = true;
    }

    pub fn trigger_dma(&mut self) {
        self.dma_pending = true;
    }

    /// Read-and-clear the pending NMI latch.
    pub fn take_nmi(&mut self) -> bool {
        let was = self.nmi_pending;
        self.nmi_pending = false;
        was
    }

    /// Read-and-clear the pending DMA latch.
    pub fn take_dma(&mut self) -> bool {
        let was = self.dma_pending;
        self.dma_pending = false;
        was
    }
}

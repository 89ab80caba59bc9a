/*!
System orchestrator: the master clock and the host-facing API.

The console is driven at the PPU rate (master/4). Every call to
`tick` advances the PPU one dot, and every third call first advances
the CPU one cycle, mirroring the hardware's 3:1 dot-to-cycle ratio.
Within such a tick the CPU steps before the PPU. Scheduling is
single-threaded and non-blocking; the host owns wall-clock pacing and
may simply stop calling `tick` to pause.

The orchestrator owns the CPU and the Bus (which in turn owns the
PPU, controllers and cartridge), threading the borrows each step
needs. Cartridges are inserted while the CPU is held in reset; call
`reset` after insertion to start fetching from the new reset vector.
*/

use crate::bus::Bus;
use crate::cartridge::Cartridge;
use crate::controller::Button;
use crate::cpu::{Cpu, CpuSnapshot};
use crate::ppu::Ppu;

/// NTSC master clock.
pub const MASTER_CLOCK_HZ: u64 = 21_477_272;
/// PPU dot clock: master / 4.
pub const PPU_CLOCK_HZ: u64 = MASTER_CLOCK_HZ / 4;
/// CPU clock: master / 12 (one CPU cycle per three PPU dots).
pub const CPU_CLOCK_HZ: u64 = PPU_CLOCK_HZ / 3;

pub struct Nes {
    cpu: Cpu,
    bus: Bus,
    tick_index: u8,
}

impl Default for Nes {
    fn default() -> Self {
        Self::new()
    }
}

impl Nes {
    pub fn new() -> Self {
        Self {
            cpu: Cpu::new(),
            bus: Bus::new(),
            tick_index: 0,
        }
    }

    /// Insert a cartridge. The CPU is only restarted by `reset`, so
    /// swapping is safe at any point the host is not ticking.
    pub fn insert_cartridge(&mut self, cart: Cartridge) {
        self.bus.insert_cartridge(cart);
    }

    /// Power/reset: clears RAM, PPU and mapper state, then restarts
    /// the CPU from the reset vector.
    pub fn reset(&mut self) {
        self.bus.reset();
        self.cpu.reset(&mut self.bus);
        self.tick_index = 0;
    }

    /// One master tick at the PPU rate: the CPU steps on every third
    /// tick (before the PPU), the PPU steps always.
    pub fn tick(&mut self) {
        if self.tick_index == 0 {
            self.cpu.tick(&mut self.bus);
        }
        self.tick_index = (self.tick_index + 1) % 3;
        self.bus.tick_ppu();
    }

    /// Tick until the PPU signals frame completion (row 240, dot 0).
    pub fn run_frame(&mut self) {
        loop {
            self.tick();
            if self.bus.ppu_mut().take_frame_complete() {
                break;
            }
        }
    }

    // -------------- Input --------------

    pub fn press_button(&mut self, controller: usize, button: Button) {
        self.bus.controller_mut(controller).press(button);
    }

    pub fn release_button(&mut self, controller: usize, button: Button) {
        self.bus.controller_mut(controller).release(button);
    }

    // -------------- Inspection --------------

    /// CPU state snapshot with no observable side effects.
    pub fn cpu_state(&self) -> CpuSnapshot {
        self.cpu.snapshot()
    }

    pub fn cpu(&self) -> &Cpu {
        &self.cpu
    }

    pub fn ppu(&self) -> &Ppu {
        self.bus.ppu()
    }

    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut Bus {
        &mut self.bus
    }

    // -------------- Frame output --------------

    pub fn active_framebuffer_id(&self) -> usize {
        self.bus.ppu().active_framebuffer_id()
    }

    pub fn framebuffer(&self, id: usize) -> &[u8] {
        self.bus.ppu().framebuffer(id)
    }

    /// The most recently completed frame.
    pub fn completed_framebuffer(&self) -> &[u8] {
        self.bus.ppu().completed_framebuffer()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpu::state::IRQ_DISABLE;
    use crate::ppu::FRAME_DOTS;
    use crate::test_utils::{build_ines_custom, build_nrom_with_prg, set_vectors_in_prg};

    fn nes_with_prg(prg: &[u8], vectors: Option<(u16, u16, u16)>) -> Nes {
        let rom = build_nrom_with_prg(prg, 1, vectors);
        let cart = Cartridge::from_ines_bytes(&rom).expect("parse");
        let mut nes = Nes::new();
        nes.insert_cartridge(cart);
        nes.reset();
        nes
    }

    #[test]
    fn reset_starts_from_vector() {
        let nes = nes_with_prg(&[0xEA], Some((0xC000, 0x8000, 0x8000)));
        let state = nes.cpu_state();
        assert_eq!(state.pc, 0xC000);
        assert_eq!(state.sp, 0xFF);
        assert_eq!(state.cycle, 7);
    }

    #[test]
    fn cpu_steps_every_third_tick() {
        let mut nes = nes_with_prg(&[0xEA, 0xEA, 0xEA, 0xEA], None);
        let start = nes.cpu_state().cycle;
        for _ in 0..9 {
            nes.tick();
        }
        assert_eq!(nes.cpu_state().cycle, start + 3);
    }

    #[test]
    fn run_frame_advances_one_frame() {
        let mut nes = nes_with_prg(&[0x4C, 0x00, 0x80], None); // spin
        nes.run_frame();
        // Frame completion lands at row 240, dot 0.
        assert_eq!(nes.ppu().scanline(), 240);
        assert_eq!(nes.ppu().dot_in_scanline(), 0);
        let first = nes.active_framebuffer_id();
        nes.run_frame();
        assert_eq!(nes.active_framebuffer_id(), first ^ 1);
    }

    #[test]
    fn vblank_nmi_reaches_the_cpu() {
        // reset: spin at $8000. NMI handler: LDA #$42; STA $0200; spin.
        let prg = [
            0x4C, 0x00, 0x80, // $8000 JMP $8000
            0xA9, 0x42, // $8003 LDA #$42
            0x8D, 0x00, 0x02, // $8005 STA $0200
            0x4C, 0x08, 0x80, // $8008 JMP $8008
        ];
        let mut nes = nes_with_prg(&prg, Some((0x8000, 0x8003, 0x8000)));
        nes.bus_mut().write(0x2000, 0x80); // enable NMI on VBlank

        for _ in 0..2 * 3 * FRAME_DOTS {
            nes.tick();
        }

        assert_eq!(nes.bus().peek(0x0200), 0x42);
        assert!(nes.cpu_state().status & IRQ_DISABLE != 0);
    }

    #[test]
    fn oam_dma_stalls_the_cpu_and_fills_oam() {
        let mut nes = nes_with_prg(&[0x4C, 0x00, 0x80], None);
        for i in 0..=255u16 {
            nes.bus_mut().write(0x0200 + i, i as u8);
        }
        nes.bus_mut().write(0x2003, 0x00);
        nes.bus_mut().write(0x4014, 0x02);

        // Let the CPU reach its next fetch; the stall lands there.
        nes.tick();
        let debt = nes.cpu().pending_cycles();
        assert!(debt >= 513, "debt was {}", debt);

        // OAM holds the identity page.
        for i in 0..=255usize {
            assert_eq!(nes.bus().ppu().peek_oam(i), i as u8);
        }
    }

    #[test]
    fn mmc1_bank_switch_through_the_bus() {
        // Eight 16 KiB banks, first byte of each marks its index.
        let mut prg = vec![0u8; 8 * 16 * 1024];
        for b in 0..8 {
            prg[b * 0x4000] = b as u8 + 1;
        }
        // Vectors in the last bank (fixed at $C000 after reset).
        let len = prg.len();
        set_vectors_in_prg(&mut prg[len - 0x4000..], 0xC000, 0xC000, 0xC000);
        let rom = build_ines_custom(&prg, &vec![0u8; 8 * 1024], 0x10, 0); // mapper 1
        let cart = Cartridge::from_ines_bytes(&rom).expect("parse");
        let mut nes = Nes::new();
        nes.insert_cartridge(cart);
        nes.reset();

        assert_eq!(nes.bus().peek(0x8000), 1);
        assert_eq!(nes.bus().peek(0xC000), 8);

        // Serial-load PRG bank 1 through the $E000 register.
        let bits = [1u8, 0, 0, 0, 0];
        for bit in bits {
            nes.bus_mut().write(0xE000, bit);
        }
        assert_eq!(nes.bus().peek(0x8000), 2);
        assert_eq!(nes.bus().peek(0xC000), 8);
    }

    #[test]
    fn controller_input_reaches_the_ports() {
        let mut nes = nes_with_prg(&[0x4C, 0x00, 0x80], None);
        nes.press_button(0, Button::START);
        nes.bus_mut().write(0x4016, 1);
        nes.bus_mut().write(0x4016, 0);
        assert_eq!(nes.bus_mut().read(0x4016), 0); // A
        assert_eq!(nes.bus_mut().read(0x4016), 0); // B
        assert_eq!(nes.bus_mut().read(0x4016), 0); // Select
        assert_eq!(nes.bus_mut().read(0x4016), 1); // Start
        nes.release_button(0, Button::START);
    }

    #[test]
    fn clock_ratios() {
        assert_eq!(PPU_CLOCK_HZ, 5_369_318);
        assert_eq!(CPU_CLOCK_HZ, 1_789_772);
    }
}

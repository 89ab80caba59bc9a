/*!
PPU (Ricoh 2C02): register protocol, VRAM/OAM/palette storage, frame
timing, and the whole-frame renderer.

The PPU advances one dot per master tick (341 dots x 262 scanlines).
Fixed dot positions drive the externally visible timing: VBlank is set
at (row 241, col 1) with an NMI latch when enabled, status flags clear
at (row 261, col 1), and frame completion plus the framebuffer swap is
signaled at (row 240, col 0). Odd frames skip one dot at the wrap when
rendering is enabled.

Rendering uses the whole-frame model: at the frame wrap both physical
nametables are prerendered into full background layers and OAM is
prerendered into a sprite layer; the visible dot walk then composes
one pixel per tick, which keeps NMI and sprite-0-hit dot-accurate
while amortizing tile fetches. Mid-frame scroll and bank changes are
not reflected until the next frame; scanline-level raster tricks are a
known non-goal of this core.

Submodules:
- `registers.rs` - CPU-visible register semantics ($2000..$2007)
- `renderer.rs` - frame prerender and the per-dot composition walk
- `palette.rs` - the static 2C02 master palette
*/

use bitflags::bitflags;

pub(crate) mod palette;
pub(crate) mod registers;
pub(crate) mod renderer;

use crate::cartridge::{Cartridge, Mirroring};

/// Screen width in pixels.
pub const SCREEN_WIDTH: usize = 256;
/// Screen height in pixels.
pub const SCREEN_HEIGHT: usize = 240;
/// RGBA bytes per pixel.
pub const BYTES_PER_PIXEL: usize = 4;

pub(crate) const SCANLINE_COLS: u32 = 341;
pub(crate) const SCANLINE_ROWS: u32 = 262;
pub(crate) const FRAME_DOTS: u32 = SCANLINE_ROWS * SCANLINE_COLS;

const TILE_BYTES: u16 = 16;
const ATTRIBUTE_TABLE_OFFSET: usize = 0x3C0;

bitflags! {
    /// PPUSTATUS ($2002) flag bits.
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    pub struct Status: u8 {
        const SPRITE_OVERFLOW = 0x20;
        const SPRITE_ZERO_HIT = 0x40;
        const VBLANK = 0x80;
    }
}

bitflags! {
    /// PPUMASK ($2001) flag bits.
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    pub struct Mask: u8 {
        const GRAYSCALE = 0x01;
        const SHOW_BACKGROUND_LEFT = 0x02;
        const SHOW_SPRITES_LEFT = 0x04;
        const SHOW_BACKGROUND = 0x08;
        const SHOW_SPRITES = 0x10;
        const EMPHASIZE_RED = 0x20;
        const EMPHASIZE_GREEN = 0x40;
        const EMPHASIZE_BLUE = 0x80;
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum SpriteSize {
    #[default]
    Eight,
    Sixteen,
}

/// PPUCTRL ($2000) parsed into its fields.
#[derive(Copy, Clone, Debug, Default)]
pub struct Control {
    pub nametable_id: u8,
    pub vram_increment: u16,
    pub sprite_table: u16,
    pub background_table: u8,
    pub sprite_size: SpriteSize,
    pub master_select: bool,
    pub nmi_enabled: bool,
}

impl From<u8> for Control {
    fn from(value: u8) -> Self {
        Self {
            nametable_id: value & 0x03,
            vram_increment: if value & 0x04 != 0 { 32 } else { 1 },
            sprite_table: if value & 0x08 != 0 { 0x1000 } else { 0x0000 },
            background_table: u8::from(value & 0x10 != 0),
            sprite_size: if value & 0x20 != 0 {
                SpriteSize::Sixteen
            } else {
                SpriteSize::Eight
            },
            master_select: value & 0x40 != 0,
            nmi_enabled: value & 0x80 != 0,
        }
    }
}

impl Control {
    fn new() -> Self {
        Self::from(0)
    }
}

/// One prerendered layer cell: resolved color plus the composition
/// attributes the dot walk needs. Alpha 0 doubles as "never written".
#[derive(Copy, Clone, Debug, Default)]
pub(crate) struct LayerDot {
    pub color: [u8; 4],
    pub opaque: bool,
    pub behind: bool,
    pub sprite_zero: bool,
}

pub struct Ppu {
    // CPU-visible registers
    pub(crate) status: Status,
    pub(crate) control: Control,
    pub(crate) mask: Mask,
    pub(crate) oam_addr: u8,

    // Storage
    pub(crate) oam: [u8; 256],
    pub(crate) vram: [u8; 0x800],
    pub(crate) palette_ram: [u8; 32],

    // $2005/$2006/$2007 latches
    pub(crate) vram_addr: u16,
    pub(crate) read_buffer: u8,
    pub(crate) scroll: [u8; 2],
    pub(crate) scroll_latch: usize,

    // Timing
    pub(crate) dot: u32,
    odd_frame: bool,
    pub(crate) sprite_zero_reported: bool,
    nmi_request: bool,
    frame_complete: bool,

    // Prerendered layers (two physical nametables, one sprite plane)
    pub(crate) background_layers: [Vec<LayerDot>; 2],
    pub(crate) sprite_layer: Vec<LayerDot>,

    // Double-buffered RGBA output
    framebuffers: [Vec<u8>; 2],
    active_framebuffer: usize,
}

impl Default for Ppu {
    fn default() -> Self {
        Self::new()
    }
}

impl Ppu {
    pub fn new() -> Self {
        let plane = vec![LayerDot::default(); SCREEN_WIDTH * SCREEN_HEIGHT];
        let frame = vec![0u8; SCREEN_WIDTH * SCREEN_HEIGHT * BYTES_PER_PIXEL];
        Self {
            status: Status::empty(),
            control: Control::new(),
            mask: Mask::empty(),
            oam_addr: 0,
            oam: [0; 256],
            vram: [0; 0x800],
            palette_ram: [0; 32],
            vram_addr: 0,
            read_buffer: 0,
            scroll: [0; 2],
            scroll_latch: 0,
            dot: 0,
            odd_frame: false,
            sprite_zero_reported: false,
            nmi_request: false,
            frame_complete: false,
            background_layers: [plane.clone(), plane.clone()],
            sprite_layer: plane,
            framebuffers: [frame.clone(), frame],
            active_framebuffer: 0,
        }
    }

    pub fn reset(&mut self) {
        self.status = Status::empty();
        self.control = Control::new();
        self.mask = Mask::empty();
        self.oam_addr = 0;
        self.oam.fill(0);
        self.vram.fill(0);
        self.palette_ram.fill(0);
        self.vram_addr = 0;
        self.read_buffer = 0;
        self.scroll = [0; 2];
        self.scroll_latch = 0;
        self.dot = 0;
        self.odd_frame = false;
        self.sprite_zero_reported = false;
        self.nmi_request = false;
        self.frame_complete = false;
        for layer in &mut self.background_layers {
            layer.fill(LayerDot::default());
        }
        self.sprite_layer.fill(LayerDot::default());
    }

    // -------------- Host-facing output --------------

    /// Index of the framebuffer currently being written.
    pub fn active_framebuffer_id(&self) -> usize {
        self.active_framebuffer
    }

    /// RGBA plane by id (0 or 1).
    pub fn framebuffer(&self, id: usize) -> &[u8] {
        &self.framebuffers[id & 1]
    }

    /// The most recently completed frame (the plane not being written).
    pub fn completed_framebuffer(&self) -> &[u8] {
        &self.framebuffers[self.active_framebuffer ^ 1]
    }

    /// Read-and-clear the frame-completion signal raised at (240, 0).
    pub fn take_frame_complete(&mut self) -> bool {
        let was = self.frame_complete;
        self.frame_complete = false;
        was
    }

    /// Read-and-clear the NMI request raised at the VBlank dot.
    pub fn take_nmi_request(&mut self) -> bool {
        let was = self.nmi_request;
        self.nmi_request = false;
        was
    }

    // -------------- Status / timing queries --------------

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn control(&self) -> Control {
        self.control
    }

    pub fn mask(&self) -> Mask {
        self.mask
    }

    pub fn scanline(&self) -> u32 {
        self.dot / SCANLINE_COLS
    }

    pub fn dot_in_scanline(&self) -> u32 {
        self.dot % SCANLINE_COLS
    }

    pub(crate) fn rendering_enabled(&self) -> bool {
        self.mask
            .intersects(Mask::SHOW_BACKGROUND | Mask::SHOW_SPRITES)
    }

    // -------------- OAM --------------

    /// Bulk OAM store used by $4014 DMA: bytes land starting at the
    /// current OAM cursor and wrap within the 256-byte table. The
    /// cursor itself is unchanged (256 post-increments wrap to it).
    pub fn oam_dma(&mut self, data: &[u8]) {
        for (i, &b) in data.iter().take(256).enumerate() {
            self.oam[(self.oam_addr as usize + i) & 0xFF] = b;
        }
    }

    #[cfg(test)]
    pub(crate) fn peek_oam(&self, idx: usize) -> u8 {
        self.oam[idx & 0xFF]
    }

    // -------------- VRAM address decode --------------

    /// Map a nametable address ($2000..$2FFF and its $3000 alias) to an
    /// index into the 2 KiB VRAM, honoring the header mirroring. With
    /// horizontal mirroring logical tables 0/1 share the first bank and
    /// 2/3 the second; with vertical, 0/2 and 1/3. Four-screen boards
    /// would need cartridge VRAM; they fall back to the vertical
    /// arrangement here.
    pub(crate) fn nametable_index(addr: u16, mirroring: Mirroring) -> usize {
        let addr = (addr as usize - 0x2000) & 0x0FFF;
        let logical = addr / 0x400;
        let offset = addr & 0x3FF;
        let physical = match mirroring {
            Mirroring::Horizontal => logical / 2,
            Mirroring::Vertical | Mirroring::FourScreen => logical % 2,
        };
        physical * 0x400 + offset
    }

    /// Palette RAM index for $3F00..$3FFF: modulo 0x20 with the
    /// $3F10/$3F14/$3F18/$3F1C aliases folded onto $3F00/04/08/0C.
    pub(crate) fn palette_index(addr: u16) -> usize {
        let idx = (addr as usize) & 0x1F;
        match idx {
            0x10 | 0x14 | 0x18 | 0x1C => idx - 0x10,
            _ => idx,
        }
    }

    /// Read from PPU address space as decoded for $2007.
    pub(crate) fn vram_read(&self, addr: u16, cart: Option<&Cartridge>) -> u8 {
        let addr = addr & 0x3FFF;
        match addr {
            0x0000..=0x1FFF => cart.map_or(0, |c| c.read_chr(addr)),
            0x2000..=0x3EFF => {
                let mirroring = cart.map_or(Mirroring::Horizontal, |c| c.mirroring());
                self.vram[Self::nametable_index(addr, mirroring)]
            }
            _ => self.palette_ram[Self::palette_index(addr)],
        }
    }

    /// Write to PPU address space as decoded for $2007. Pattern-table
    /// writes go to the mapper (CHR RAM boards accept them).
    pub(crate) fn vram_write(&mut self, addr: u16, value: u8, cart: Option<&mut Cartridge>) {
        let addr = addr & 0x3FFF;
        match addr {
            0x0000..=0x1FFF => {
                if let Some(c) = cart {
                    c.write_chr(addr, value);
                }
            }
            0x2000..=0x3EFF => {
                let mirroring = cart.map_or(Mirroring::Horizontal, |c| c.mirroring());
                self.vram[Self::nametable_index(addr, mirroring)] = value;
            }
            _ => self.palette_ram[Self::palette_index(addr)] = value,
        }
    }
}

/*!
Whole-frame renderer and the per-dot timing walk.

At the frame wrap both physical nametables are decoded into full
256x240 background layers and OAM into a sprite layer; each visible
dot then costs one composition step. The externally visible flags
(VBlank, NMI latch, sprite-0 hit, frame completion) are raised at
their fixed dot positions during the walk, so timing-sensitive guest
code observes them at the right cycle even though tile fetches are
amortized.

Composition rule per visible dot: the background pixel is selected by
adding the scroll offset and wrapping horizontally into the other
nametable layer; an opaque sprite pixel wins unless it is marked
behind-background and the background is opaque; sprite-0 hit is
reported once per frame on the first opaque/opaque overlap.
*/

use super::palette;
use super::{
    Cartridge, LayerDot, Mask, Ppu, Status, ATTRIBUTE_TABLE_OFFSET, FRAME_DOTS, SCANLINE_COLS,
    SCREEN_HEIGHT, SCREEN_WIDTH, TILE_BYTES,
};

/// Frame completion / framebuffer swap: row 240, col 0.
const FRAME_COMPLETE_DOT: u32 = 240 * SCANLINE_COLS;
/// VBlank + NMI latch: row 241, col 1.
const VBLANK_SET_DOT: u32 = 241 * SCANLINE_COLS + 1;
/// VBlank, sprite-0 and overflow clear: row 261, col 1.
const STATUS_CLEAR_DOT: u32 = 261 * SCANLINE_COLS + 1;

/// An 8x8 tile unpacked from its two CHR bitplanes into 2-bit pixels.
pub(crate) struct Tile {
    data: [u8; 64],
}

impl Tile {
    /// Decode a 16-byte CHR tile. Short spans (a mapper rejected the
    /// fetch) decode as fully transparent.
    pub(crate) fn from_chr(src: &[u8]) -> Self {
        let mut data = [0u8; 64];
        if src.len() >= TILE_BYTES as usize {
            for row in 0..8 {
                for col in 0..8 {
                    let lo = (src[row] >> (7 - col)) & 1;
                    let hi = (src[8 + row] >> (7 - col)) & 1;
                    data[row * 8 + col] = (hi << 1) | lo;
                }
            }
        }
        Self { data }
    }

    #[inline]
    fn pixel(&self, row: usize, col: usize) -> u8 {
        self.data[row * 8 + col]
    }
}

/// Two-bit palette selector for a tile from its attribute byte. The
/// byte covers a 4x4 tile block; the quadrant is chosen by one bit
/// from `row mod 4` and one from `col mod 4`.
fn attribute_quadrant(attr: u8, row: usize, col: usize) -> u8 {
    let mut quad = 0;
    if row % 4 >= 2 {
        quad |= 2;
    }
    if col % 4 >= 2 {
        quad |= 1;
    }
    (attr >> (quad * 2)) & 0x03
}

impl Ppu {
    /// Advance one dot. Called once per master tick.
    pub fn tick(&mut self, cart: Option<&Cartridge>) {
        let mut new_dot = (self.dot + 1) % FRAME_DOTS;

        if new_dot == 0 {
            self.prerender_frame(cart);
            self.sprite_zero_reported = false;
            self.odd_frame = !self.odd_frame;
            if self.odd_frame && self.rendering_enabled() {
                // Odd frames drop the first idle dot.
                new_dot += 1;
            }
        }

        if new_dot == FRAME_COMPLETE_DOT {
            self.frame_complete = true;
            self.active_framebuffer ^= 1;
        }
        if new_dot == VBLANK_SET_DOT {
            self.status.insert(Status::VBLANK);
            if self.control.nmi_enabled {
                self.nmi_request = true;
            }
        }
        if new_dot == STATUS_CLEAR_DOT {
            self.status = Status::empty();
        }

        self.dot = new_dot;

        let col = (self.dot % SCANLINE_COLS) as usize;
        let row = (self.dot / SCANLINE_COLS) as usize;
        if col < SCREEN_WIDTH && row < SCREEN_HEIGHT {
            self.compose_dot(col, row);
        }
    }

    /// Rebuild the background and sprite layers for the coming frame.
    fn prerender_frame(&mut self, cart: Option<&Cartridge>) {
        self.render_background_layers(cart);
        self.render_sprite_layer(cart);
    }

    fn render_background_layers(&mut self, cart: Option<&Cartridge>) {
        for layer in &mut self.background_layers {
            layer.fill(LayerDot::default());
        }
        if !self
            .mask
            .intersects(Mask::SHOW_BACKGROUND | Mask::SHOW_BACKGROUND_LEFT)
        {
            return;
        }
        let Some(cart) = cart else { return };

        let pattern_base = self.control.background_table as u16 * 0x1000;
        let Self {
            vram,
            palette_ram,
            background_layers,
            ..
        } = self;

        for (buf_idx, layer) in background_layers.iter_mut().enumerate() {
            let nt_base = buf_idx * 0x400;
            let attr_base = nt_base + ATTRIBUTE_TABLE_OFFSET;

            for row in 0..30 {
                for col in 0..32 {
                    let tile_id = vram[nt_base + row * 32 + col] as u16;
                    let tile = Tile::from_chr(
                        cart.read_chr_span(pattern_base + tile_id * TILE_BYTES, TILE_BYTES as usize),
                    );
                    let attr = vram[attr_base + (row / 4) * 8 + col / 4];
                    let palette_idx = attribute_quadrant(attr, row, col) as usize;

                    for py in 0..8 {
                        for px in 0..8 {
                            let ci = tile.pixel(py, px) as usize;
                            // Color 0 resolves to the universal backdrop.
                            let entry = if ci == 0 {
                                palette_ram[0]
                            } else {
                                palette_ram[palette_idx * 4 + ci]
                            };
                            layer[(row * 8 + py) * SCREEN_WIDTH + col * 8 + px] = LayerDot {
                                color: palette::rgba(entry),
                                opaque: ci != 0,
                                behind: false,
                                sprite_zero: false,
                            };
                        }
                    }
                }
            }
        }
    }

    fn render_sprite_layer(&mut self, cart: Option<&Cartridge>) {
        self.sprite_layer.fill(LayerDot::default());
        if !self
            .mask
            .intersects(Mask::SHOW_SPRITES | Mask::SHOW_SPRITES_LEFT)
        {
            return;
        }
        let Some(cart) = cart else { return };

        let sprite_base = self.control.sprite_table;
        let Self {
            oam,
            palette_ram,
            sprite_layer,
            ..
        } = self;

        // Walk OAM back to front so entry 0 wins the final composite.
        for i in (0..64usize).rev() {
            let y = oam[i * 4];
            let id = oam[i * 4 + 1] as u16;
            let attr = oam[i * 4 + 2];
            let x = oam[i * 4 + 3];
            if y >= 0xEF || x >= 240 {
                continue;
            }

            let tile =
                Tile::from_chr(cart.read_chr_span(sprite_base + id * TILE_BYTES, TILE_BYTES as usize));
            let palette_base = (4 + (attr & 0x03) as usize) * 4;
            let flip_h = attr & 0x40 != 0;
            let flip_v = attr & 0x80 != 0;
            let behind = attr & 0x20 != 0;

            for py in 0..8 {
                for px in 0..8 {
                    let ci = tile.pixel(py, px) as usize;
                    let color = palette::rgba(palette_ram[palette_base + ci]);
                    let dx = if flip_h { 7 - px } else { px };
                    let dy = if flip_v { 7 - py } else { py };

                    // Sprite data renders one line below its OAM Y.
                    let dest_y = y as usize + 1 + dy;
                    let dest_x = x as usize + dx;
                    if dest_y >= SCREEN_HEIGHT || dest_x >= SCREEN_WIDTH {
                        continue;
                    }
                    let idx = dest_y * SCREEN_WIDTH + dest_x;

                    let opaque = ci != 0;
                    // Transparent pixels of a front sprite must not
                    // erase what a back sprite already drew.
                    if !opaque && sprite_layer[idx].color[3] != 0 {
                        continue;
                    }
                    sprite_layer[idx] = LayerDot {
                        color,
                        opaque,
                        behind,
                        sprite_zero: i == 0,
                    };
                }
            }
        }
    }

    /// Compose one visible pixel into the active framebuffer.
    fn compose_dot(&mut self, col: usize, row: usize) {
        let dst = row * SCREEN_WIDTH + col;
        let scroll_x = self.scroll[0] as usize;
        let scroll_y = self.scroll[1] as usize;
        let nt = (self.control.nametable_id & 1) as usize;

        let s_col = col + scroll_x;
        let s_row = (row + scroll_y) % SCREEN_HEIGHT;
        let bg = if s_col >= SCREEN_WIDTH {
            self.background_layers[nt ^ 1][s_row * SCREEN_WIDTH + (s_col - SCREEN_WIDTH)]
        } else {
            self.background_layers[nt][s_row * SCREEN_WIDTH + s_col]
        };

        let base = dst * 4;
        let frame = &mut self.framebuffers[self.active_framebuffer];
        frame[base..base + 4].copy_from_slice(&bg.color);

        let sp = self.sprite_layer[dst];
        if sp.color[3] != 0 && sp.opaque {
            if !sp.behind || !bg.opaque {
                frame[base..base + 4].copy_from_slice(&sp.color);
            }
            if bg.opaque && sp.sprite_zero && !self.sprite_zero_reported {
                self.status.insert(Status::SPRITE_ZERO_HIT);
                self.sprite_zero_reported = true;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cartridge::Cartridge;
    use crate::test_utils::build_ines_with_chr;

    /// CHR image whose tile 1 is solid color-index 1 and tile 2 solid
    /// color-index 2.
    fn chr_solid_tiles() -> Vec<u8> {
        let mut chr = vec![0u8; 8 * 1024];
        for row in 0..8 {
            chr[16 + row] = 0xFF; // tile 1, low plane
            chr[32 + 8 + row] = 0xFF; // tile 2, high plane
        }
        chr
    }

    fn cart_with_solid_tiles() -> Cartridge {
        let rom = build_ines_with_chr(1, 0, &chr_solid_tiles());
        Cartridge::from_ines_bytes(&rom).expect("parse")
    }

    fn run_frames(p: &mut Ppu, cart: &Cartridge, frames: u32) {
        for _ in 0..frames * FRAME_DOTS {
            p.tick(Some(cart));
        }
    }

    #[test]
    fn vblank_sets_at_241_1_and_latches_nmi() {
        let mut p = Ppu::new();
        p.write_reg(0x2000, 0x80, None); // NMI enable
        for _ in 0..VBLANK_SET_DOT - 1 {
            p.tick(None);
        }
        assert!(!p.status.contains(Status::VBLANK));
        p.tick(None);
        assert!(p.status.contains(Status::VBLANK));
        assert!(p.take_nmi_request());
        assert!(!p.take_nmi_request());
    }

    #[test]
    fn no_nmi_latch_when_disabled() {
        let mut p = Ppu::new();
        for _ in 0..VBLANK_SET_DOT {
            p.tick(None);
        }
        assert!(p.status.contains(Status::VBLANK));
        assert!(!p.take_nmi_request());
    }

    #[test]
    fn status_clears_on_prerender_line() {
        let mut p = Ppu::new();
        p.status =
            Status::VBLANK | Status::SPRITE_ZERO_HIT | Status::SPRITE_OVERFLOW;
        for _ in 0..STATUS_CLEAR_DOT {
            p.tick(None);
        }
        assert!(p.status.is_empty());
    }

    #[test]
    fn frame_completes_and_swaps_at_240_0() {
        let mut p = Ppu::new();
        assert_eq!(p.active_framebuffer_id(), 0);
        for _ in 0..FRAME_COMPLETE_DOT {
            p.tick(None);
        }
        assert!(p.take_frame_complete());
        assert!(!p.take_frame_complete());
        assert_eq!(p.active_framebuffer_id(), 1);
    }

    #[test]
    fn odd_frames_skip_a_dot_only_while_rendering() {
        let mut p = Ppu::new();
        // Rendering disabled: the wrap lands on dot 0.
        for _ in 0..FRAME_DOTS {
            p.tick(None);
        }
        assert_eq!(p.dot, 0);

        let mut p = Ppu::new();
        p.write_reg(0x2001, 0x08, None); // show background
        for _ in 0..FRAME_DOTS {
            p.tick(None);
        }
        assert_eq!(p.dot, 1);
        // The following (even) frame does not skip.
        for _ in 0..FRAME_DOTS - 1 {
            p.tick(None);
        }
        assert_eq!(p.dot, 0);
    }

    #[test]
    fn background_tile_renders_with_palette_color() {
        let cart = cart_with_solid_tiles();
        let mut p = Ppu::new();
        p.write_reg(0x2001, 0x08, None); // show background
        p.vram[0] = 1; // nametable 0, tile (0,0) -> solid color 1
        p.palette_ram[0] = 0x0F; // backdrop: black
        p.palette_ram[1] = 0x16; // palette 0, color 1

        run_frames(&mut p, &cart, 2);

        let frame = p.completed_framebuffer();
        // Column 1 (dot 0 is the odd-frame skip dot; column 0 of row 0
        // is never composed on the skipping frame).
        assert_eq!(&frame[4..8], &palette::rgba(0x16));
        // Tile (0,1) was left at id 0: backdrop shows through.
        assert_eq!(&frame[8 * 4..8 * 4 + 4], &palette::rgba(0x0F));
    }

    #[test]
    fn attribute_quadrants_select_palettes() {
        assert_eq!(attribute_quadrant(0b11_10_01_00, 0, 0), 0b00);
        assert_eq!(attribute_quadrant(0b11_10_01_00, 0, 2), 0b01);
        assert_eq!(attribute_quadrant(0b11_10_01_00, 2, 0), 0b10);
        assert_eq!(attribute_quadrant(0b11_10_01_00, 2, 2), 0b11);
        // Wraps every four tiles.
        assert_eq!(attribute_quadrant(0b11_10_01_00, 4, 5), 0b00);
        assert_eq!(attribute_quadrant(0b11_10_01_00, 5, 7), 0b01);
    }

    #[test]
    fn sprite_wins_over_transparent_background() {
        let cart = cart_with_solid_tiles();
        let mut p = Ppu::new();
        p.write_reg(0x2001, 0x18, None); // background + sprites
        p.palette_ram[0] = 0x0F;
        p.palette_ram[(4 * 4) + 1] = 0x2A; // sprite palette 0, color 1
        // Sprite 0 at (x=8, y=7): rows render at y+1.
        p.oam[0] = 7;
        p.oam[1] = 1; // solid tile
        p.oam[2] = 0;
        p.oam[3] = 8;

        run_frames(&mut p, &cart, 2);

        let frame = p.completed_framebuffer();
        let idx = (8 * SCREEN_WIDTH + 8) * 4;
        assert_eq!(&frame[idx..idx + 4], &palette::rgba(0x2A));
    }

    #[test]
    fn behind_background_sprite_hides_under_opaque_pixels() {
        let cart = cart_with_solid_tiles();
        let mut p = Ppu::new();
        p.write_reg(0x2001, 0x18, None);
        p.vram[0] = 1; // tile (0,0) opaque
        p.palette_ram[1] = 0x16;
        p.palette_ram[(4 * 4) + 1] = 0x2A;
        p.oam[0] = 0;
        p.oam[1] = 1;
        p.oam[2] = 0x20; // behind background
        p.oam[3] = 0;

        run_frames(&mut p, &cart, 2);

        let frame = p.completed_framebuffer();
        // Within the opaque tile the background shows.
        let idx = (1 * SCREEN_WIDTH + 0) * 4;
        assert_eq!(&frame[idx..idx + 4], &palette::rgba(0x16));
    }

    #[test]
    fn sprite_zero_hit_reported_once_on_overlap() {
        let cart = cart_with_solid_tiles();
        let mut p = Ppu::new();
        p.write_reg(0x2001, 0x18, None);
        p.vram[0] = 1; // opaque background at tile (0,0)
        p.oam[0] = 0;
        p.oam[1] = 1;
        p.oam[2] = 0;
        p.oam[3] = 0;

        run_frames(&mut p, &cart, 2);
        assert!(p.status.contains(Status::SPRITE_ZERO_HIT));
    }

    #[test]
    fn no_sprite_zero_hit_without_overlap() {
        let cart = cart_with_solid_tiles();
        let mut p = Ppu::new();
        p.write_reg(0x2001, 0x18, None);
        // Background left empty; sprite 0 opaque at (0,0).
        p.oam[0] = 0;
        p.oam[1] = 1;
        p.oam[2] = 0;
        p.oam[3] = 0;

        run_frames(&mut p, &cart, 2);
        assert!(!p.status.contains(Status::SPRITE_ZERO_HIT));
    }

    #[test]
    fn horizontal_scroll_wraps_into_other_nametable() {
        let rom = build_ines_with_chr(1, 0x01, &chr_solid_tiles()); // vertical mirroring
        let cart = Cartridge::from_ines_bytes(&rom).expect("parse");
        let mut p = Ppu::new();
        p.write_reg(0x2001, 0x08, None);
        // Physical table 1, tile (0,0) = solid tile 2.
        p.vram[0x400] = 2;
        p.palette_ram[0] = 0x0F;
        p.palette_ram[2] = 0x21;
        p.scroll = [8, 0]; // one tile to the right

        run_frames(&mut p, &cart, 2);

        let frame = p.completed_framebuffer();
        // Column 248 + scroll 8 wraps to the other table's column 0.
        let idx = (0 * SCREEN_WIDTH + 248) * 4;
        assert_eq!(&frame[idx..idx + 4], &palette::rgba(0x21));
    }

    #[test]
    fn vertically_flipped_sprite_reverses_rows() {
        // Tile 3: top row only -> after vertical flip the bottom row.
        let mut chr = vec![0u8; 8 * 1024];
        chr[3 * 16] = 0xFF; // tile 3, low plane, row 0
        let rom = build_ines_with_chr(1, 0, &chr);
        let cart = Cartridge::from_ines_bytes(&rom).expect("parse");

        let mut p = Ppu::new();
        p.write_reg(0x2001, 0x10, None); // sprites only
        p.palette_ram[(4 * 4) + 1] = 0x2A;
        p.oam[0] = 15;
        p.oam[1] = 3;
        p.oam[2] = 0x80; // vertical flip
        p.oam[3] = 0;

        run_frames(&mut p, &cart, 2);

        let frame = p.completed_framebuffer();
        // Flipped: the lit row lands at y = 15 + 1 + 7.
        let lit = ((15 + 1 + 7) * SCREEN_WIDTH) * 4;
        assert_eq!(&frame[lit..lit + 4], &palette::rgba(0x2A));
        let unlit = ((15 + 1) * SCREEN_WIDTH) * 4;
        assert_ne!(&frame[unlit..unlit + 4], &palette::rgba(0x2A));
    }
}

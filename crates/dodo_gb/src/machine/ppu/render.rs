use super::Ppu;
use crate::SCREEN_WIDTH;

const MAX_SPRITES_PER_LINE: usize = 10;
const OAM_ENTRIES: usize = 40;
const WINDOW_X_MAX: u8 = 166;

const BG_MAP_0: usize = 0x1800;
const BG_MAP_1: usize = 0x1C00;

/// DMG shades as RGB555, lightest first.
const DMG_COLORS: [u16; 4] = [0x7FFF, 0x56B5, 0x294A, 0x0000];

#[derive(Clone, Copy, Debug)]
struct Sprite {
    x: i16,
    y: i16,
    tile: u8,
    flags: u8,
    oam_index: usize,
}

/// Background/window result for one pixel.
#[derive(Clone, Copy)]
struct BgPixel {
    color_id: u8,
    color: u16,
    /// CGB attribute bit 7: BG over sprites.
    priority: bool,
}

/// What sprites need to know about the background line underneath.
struct LineState {
    color_zero: [bool; SCREEN_WIDTH],
    bg_priority: [bool; SCREEN_WIDTH],
}

#[inline]
fn dmg_shade(palette: u8, color_id: u8) -> u16 {
    DMG_COLORS[((palette >> (color_id * 2)) & 0x03) as usize]
}

#[inline]
fn cgb_color(palette_ram: &[u8], palette: u8, color_id: u8) -> u16 {
    let offset = palette as usize * 8 + color_id as usize * 2;
    u16::from_le_bytes([palette_ram[offset], palette_ram[offset + 1]]) & 0x7FFF
}

#[inline]
fn pixel_color_id(lo: u8, hi: u8, bit: usize) -> u8 {
    (((hi >> bit) & 1) << 1) | ((lo >> bit) & 1)
}

impl Ppu {
    /// Render scanline LY into the framebuffer.
    ///
    /// # Panics
    ///
    /// Panics when LY is outside the visible area.
    pub(super) fn draw_line(&mut self) {
        assert!(
            (self.ly as usize) < self.framebuffer.len(),
            "draw_line called on invisible line {}",
            self.ly
        );

        let mut line = LineState {
            color_zero: [true; SCREEN_WIDTH],
            bg_priority: [false; SCREEN_WIDTH],
        };

        if self.cgb || self.lcdc & 0x01 != 0 {
            self.draw_background(&mut line);
            self.draw_window(&mut line);
        } else {
            let blank = dmg_shade(self.bgp, 0);
            self.framebuffer[self.ly as usize].fill(blank);
        }

        if self.lcdc & 0x02 != 0 {
            self.draw_sprites(&line);
        }
    }

    /// VRAM offset of a BG/window tile's pixel data (LCDC bit 4 selects the
    /// unsigned 0x8000 or the signed 0x9000 addressing mode).
    fn bg_tile_addr(&self, index: u8) -> usize {
        if self.lcdc & 0x10 != 0 {
            index as usize * 16
        } else {
            (0x1000 + index as i8 as i32 * 16) as usize
        }
    }

    /// Sample the 256x256 tile map at (`px`, `py`).
    fn bg_pixel(&self, map_base: usize, px: usize, py: usize) -> BgPixel {
        let map_index = map_base + (py / 8) * 32 + px / 8;
        let tile = self.vram[0][map_index];
        let attr = if self.cgb { self.vram[1][map_index] } else { 0 };

        let mut row = py % 8;
        if attr & 0x40 != 0 {
            row = 7 - row;
        }
        let bit = if attr & 0x20 != 0 { px % 8 } else { 7 - px % 8 };
        let bank = ((attr >> 3) & 0x01) as usize;

        let addr = self.bg_tile_addr(tile) + row * 2;
        let color_id = pixel_color_id(self.vram[bank][addr], self.vram[bank][addr + 1], bit);
        let color = if self.cgb {
            cgb_color(&self.bg_palette, attr & 0x07, color_id)
        } else {
            dmg_shade(self.bgp, color_id)
        };

        BgPixel {
            color_id,
            color,
            priority: attr & 0x80 != 0,
        }
    }

    fn put_bg_pixel(&mut self, line: &mut LineState, x: usize, pixel: BgPixel) {
        self.framebuffer[self.ly as usize][x] = pixel.color;
        line.color_zero[x] = pixel.color_id == 0;
        line.bg_priority[x] = pixel.priority;
    }

    fn draw_background(&mut self, line: &mut LineState) {
        let map_base = if self.lcdc & 0x08 != 0 { BG_MAP_1 } else { BG_MAP_0 };
        let py = self.ly.wrapping_add(self.scy) as usize;
        for x in 0..SCREEN_WIDTH {
            let px = (x as u8).wrapping_add(self.scx) as usize;
            let pixel = self.bg_pixel(map_base, px, py);
            self.put_bg_pixel(line, x, pixel);
        }
    }

    fn draw_window(&mut self, line: &mut LineState) {
        if self.lcdc & 0x20 == 0 || self.wy > self.ly || self.wx > WINDOW_X_MAX {
            return;
        }

        let map_base = if self.lcdc & 0x40 != 0 { BG_MAP_1 } else { BG_MAP_0 };
        let origin = self.wx as i16 - 7;
        let py = self.window_line as usize;
        for x in origin.max(0) as usize..SCREEN_WIDTH {
            let px = (x as i16 - origin) as usize;
            let pixel = self.bg_pixel(map_base, px, py);
            self.put_bg_pixel(line, x, pixel);
        }
        self.window_line = self.window_line.wrapping_add(1);
    }

    /// Up to ten sprites overlapping LY, in drawing priority order.
    fn oam_scan(&self) -> Vec<Sprite> {
        let height: i16 = if self.lcdc & 0x04 != 0 { 16 } else { 8 };
        let ly = self.ly as i16;

        let mut sprites: Vec<Sprite> = (0..OAM_ENTRIES)
            .map(|i| {
                let entry = &self.oam[i * 4..i * 4 + 4];
                Sprite {
                    y: entry[0] as i16 - 16,
                    x: entry[1] as i16 - 8,
                    tile: entry[2],
                    flags: entry[3],
                    oam_index: i,
                }
            })
            .filter(|s| ly >= s.y && ly < s.y + height)
            .take(MAX_SPRITES_PER_LINE)
            .collect();

        if !self.cgb {
            sprites.sort_by_key(|s| (s.x, s.oam_index));
        }
        sprites
    }

    fn draw_sprites(&mut self, line: &LineState) {
        let height: i16 = if self.lcdc & 0x04 != 0 { 16 } else { 8 };
        // CGB: LCDC bit 0 clear lets sprites ignore every BG priority flag.
        let master_priority = !self.cgb || self.lcdc & 0x01 != 0;
        let mut claimed = [false; SCREEN_WIDTH];

        for sprite in self.oam_scan() {
            let tile = if height == 16 { sprite.tile & 0xFE } else { sprite.tile };
            let mut row = self.ly as i16 - sprite.y;
            if sprite.flags & 0x40 != 0 {
                row = height - 1 - row;
            }
            let bank = if self.cgb { ((sprite.flags >> 3) & 0x01) as usize } else { 0 };
            let addr = tile as usize * 16 + row as usize * 2;
            let lo = self.vram[bank][addr];
            let hi = self.vram[bank][addr + 1];

            for px in 0..8usize {
                let sx = sprite.x + px as i16;
                if !(0..SCREEN_WIDTH as i16).contains(&sx) {
                    continue;
                }
                let sx = sx as usize;
                let bit = if sprite.flags & 0x20 != 0 { px } else { 7 - px };
                let color_id = pixel_color_id(lo, hi, bit);
                if color_id == 0 || claimed[sx] {
                    continue;
                }
                claimed[sx] = true;

                if master_priority && !line.color_zero[sx] {
                    let behind = sprite.flags & 0x80 != 0 || (self.cgb && line.bg_priority[sx]);
                    if behind {
                        continue;
                    }
                }

                let color = if self.cgb {
                    cgb_color(&self.obj_palette, sprite.flags & 0x07, color_id)
                } else if sprite.flags & 0x10 != 0 {
                    dmg_shade(self.obp1, color_id)
                } else {
                    dmg_shade(self.obp0, color_id)
                };
                self.framebuffer[self.ly as usize][sx] = color;
            }
        }
    }
}

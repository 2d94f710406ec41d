use super::{Mode, Ppu, PALETTE_RAM_SIZE};

const PALETTE_INDEX_MASK: u8 = 0x3F;
const PALETTE_AUTO_INCREMENT: u8 = 0x80;

impl Ppu {
    /// LCD register reads (FF40-FF4B, VBK and the CGB palette ports).
    pub(in super::super) fn read(&self, addr: u16) -> u8 {
        match addr {
            0xFF40 => self.lcdc,
            0xFF41 => {
                let coincidence = if self.ly == self.lyc { 0x04 } else { 0 };
                0x80 | self.stat | coincidence | self.mode as u8
            }
            0xFF42 => self.scy,
            0xFF43 => self.scx,
            0xFF44 => self.ly,
            0xFF45 => self.lyc,
            0xFF47 => self.bgp,
            0xFF48 => self.obp0,
            0xFF49 => self.obp1,
            0xFF4A => self.wy,
            0xFF4B => self.wx,
            0xFF4F => 0xFE | self.vram_bank as u8,
            0xFF68 => self.bcps | 0x40,
            0xFF69 => self.bg_palette[palette_index(self.bcps)],
            0xFF6A => self.ocps | 0x40,
            0xFF6B => self.obj_palette[palette_index(self.ocps)],
            _ => 0,
        }
    }

    pub(in super::super) fn write(&mut self, addr: u16, value: u8) {
        match addr {
            0xFF40 => self.write_lcdc(value),
            // Only the interrupt enables are writable.
            0xFF41 => self.stat = value & 0x78,
            0xFF42 => self.scy = value,
            0xFF43 => self.scx = value,
            0xFF44 => {}
            0xFF45 => self.lyc = value,
            0xFF47 => self.bgp = value,
            0xFF48 => self.obp0 = value,
            0xFF49 => self.obp1 = value,
            0xFF4A => self.wy = value,
            0xFF4B => self.wx = value,
            0xFF4F => {
                if self.cgb {
                    self.vram_bank = (value & 0x01) as usize;
                }
            }
            0xFF68 => self.bcps = value & (PALETTE_AUTO_INCREMENT | PALETTE_INDEX_MASK),
            0xFF69 => {
                self.bg_palette[palette_index(self.bcps)] = value;
                advance_palette_index(&mut self.bcps);
            }
            0xFF6A => self.ocps = value & (PALETTE_AUTO_INCREMENT | PALETTE_INDEX_MASK),
            0xFF6B => {
                self.obj_palette[palette_index(self.ocps)] = value;
                advance_palette_index(&mut self.ocps);
            }
            _ => {}
        }
    }

    fn write_lcdc(&mut self, value: u8) {
        let was_on = self.lcd_on();
        self.lcdc = value;
        match (was_on, self.lcd_on()) {
            (true, false) => {
                self.ly = 0;
                self.dots = 0;
                self.window_line = 0;
                self.mode = Mode::HBlank;
            }
            (false, true) => {
                self.ly = 0;
                self.dots = 0;
                self.mode = Mode::OamSearch;
            }
            _ => {}
        }
    }
}

#[inline]
fn palette_index(selector: u8) -> usize {
    (selector & PALETTE_INDEX_MASK) as usize % PALETTE_RAM_SIZE
}

fn advance_palette_index(selector: &mut u8) {
    if *selector & PALETTE_AUTO_INCREMENT != 0 {
        let next = (*selector + 1) & PALETTE_INDEX_MASK;
        *selector = PALETTE_AUTO_INCREMENT | next;
    }
}

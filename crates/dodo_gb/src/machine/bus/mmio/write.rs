use super::super::GameboyBus;
use crate::machine::Interrupt;

impl GameboyBus {
    pub(super) fn write8_mmio_impl(&mut self, addr: u16, value: u8) {
        match addr {
            // Cartridge area: ROM writes drive the MBC registers.
            0x0000..=0x7FFF | 0xA000..=0xBFFF => {
                if let Some(mbc) = self.mbc.as_mut() {
                    mbc.write(addr, value);
                }
            }

            0x8000..=0x9FFF => self.ppu.write_vram(addr, value),

            0xC000..=0xDFFF => {
                let index = self.wram_index(addr);
                self.wram[index] = value;
            }

            0xE000..=0xFDFF => {
                let index = self.wram_index(addr - 0x2000);
                self.wram[index] = value;
            }

            0xFE00..=0xFE9F => self.ppu.write_oam((addr - 0xFE00) as usize, value),

            0xFEA0..=0xFEFF => {}

            0xFF00..=0xFF7F => self.write_io(addr, value),

            0xFF80..=0xFFFE => self.hram[(addr - 0xFF80) as usize] = value,

            0xFFFF => self.ie_reg = value,
        }
    }

    fn write_io(&mut self, addr: u16, value: u8) {
        match addr {
            0xFF00 => self.write_joyp(value),
            0xFF01 | 0xFF02 => {
                if self.serial.write(addr, value) {
                    self.request_interrupt(Interrupt::SERIAL);
                }
            }
            0xFF04..=0xFF07 => self.timer.write(addr, value),
            // Only the lower 5 bits are backed.
            0xFF0F => self.if_reg = value & 0x1F,
            0xFF10..=0xFF26 | 0xFF30..=0xFF3F => self.apu.write(addr, value),
            0xFF40..=0xFF45 | 0xFF47..=0xFF4B => self.ppu.write(addr, value),
            0xFF46 => self.do_oam_dma(value),

            // --- CGB-only registers ---
            0xFF4D | 0xFF4F | 0xFF51..=0xFF55 | 0xFF68..=0xFF6B | 0xFF70 if !self.cgb => {}
            0xFF4D => self.speed_switch_prepare = value & 0x01 != 0,
            0xFF4F | 0xFF68..=0xFF6B => self.ppu.write(addr, value),
            0xFF51..=0xFF54 => self.write_hdma_address(addr, value),
            0xFF55 => self.write_hdma5(value),
            0xFF70 => self.wram_bank = value & 0x07,

            _ => {}
        }
    }
}

use super::super::GameboyBus;

impl GameboyBus {
    pub(super) fn read8_mmio_impl(&self, addr: u16) -> u8 {
        match addr {
            // Cartridge ROM and external RAM; open bus reads 0 with no cart.
            0x0000..=0x7FFF | 0xA000..=0xBFFF => self.mbc.as_ref().map_or(0, |mbc| mbc.read(addr)),

            0x8000..=0x9FFF => self.ppu.read_vram(addr),

            0xC000..=0xDFFF => self.wram[self.wram_index(addr)],

            // Echo RAM: 0xE000..0xFDFF mirrors 0xC000..0xDDFF.
            0xE000..=0xFDFF => self.wram[self.wram_index(addr - 0x2000)],

            0xFE00..=0xFE9F => self.ppu.read_oam((addr - 0xFE00) as usize),

            // Unusable area.
            0xFEA0..=0xFEFF => 0,

            0xFF00..=0xFF7F => self.read_io(addr),

            0xFF80..=0xFFFE => self.hram[(addr - 0xFF80) as usize],

            0xFFFF => self.ie_reg,
        }
    }

    fn read_io(&self, addr: u16) -> u8 {
        match addr {
            0xFF00 => self.read_joyp(),
            0xFF01 | 0xFF02 => self.serial.read(addr),
            0xFF04..=0xFF07 => self.timer.read(addr),
            // Upper three bits of IF always read as 1.
            0xFF0F => self.if_reg | 0xE0,
            0xFF10..=0xFF26 | 0xFF30..=0xFF3F => self.apu.read(addr),
            0xFF40..=0xFF45 | 0xFF47..=0xFF4B => self.ppu.read(addr),
            0xFF46 => self.oam_dma_source,

            // --- CGB-only registers ---
            0xFF4D | 0xFF4F | 0xFF51..=0xFF55 | 0xFF68..=0xFF6B | 0xFF70 if !self.cgb => 0xFF,
            0xFF4D => ((self.double_speed as u8) << 7) | self.speed_switch_prepare as u8,
            0xFF4F | 0xFF68..=0xFF6B => self.ppu.read(addr),
            0xFF51..=0xFF55 => self.read_hdma(addr),
            0xFF70 => 0xF8 | self.wram_bank,

            _ => 0,
        }
    }
}

use super::{banked_read, banked_write, restore_ram, Mapper, SaveFile, RAM_BANK_SIZE, ROM_BANK_SIZE};

/// MBC5 controller: 9-bit ROM bank (bank 0 allowed in the high window)
/// and up to 16 RAM banks.
pub(in super::super) struct Mbc5 {
    rom: Vec<u8>,
    ram: Vec<u8>,
    ram_enabled: bool,
    rom_bank: u16,
    ram_bank: u8,
    save: Option<SaveFile>,
}

impl Mbc5 {
    pub(super) fn new(rom: Vec<u8>, ram_size: usize, save: Option<SaveFile>) -> Self {
        let mut ram = vec![0; ram_size];
        if let Some(saved) = save.as_ref().and_then(SaveFile::load) {
            restore_ram(&mut ram, &saved);
        }
        Self {
            rom,
            ram,
            ram_enabled: false,
            rom_bank: 1,
            ram_bank: 0,
            save,
        }
    }
}

impl Mapper for Mbc5 {
    fn read_rom_lo(&self, addr: u16) -> u8 {
        banked_read(&self.rom, 0, ROM_BANK_SIZE, addr)
    }

    fn read_rom_hi(&self, offset: u16) -> u8 {
        banked_read(&self.rom, self.rom_bank as usize, ROM_BANK_SIZE, offset)
    }

    fn read_ram(&self, offset: u16) -> u8 {
        if !self.ram_enabled {
            return 0xFF;
        }
        banked_read(&self.ram, self.ram_bank as usize, RAM_BANK_SIZE, offset)
    }

    fn write_rom_lo(&mut self, addr: u16, value: u8) {
        match addr {
            0x0000..=0x1FFF => self.ram_enabled = value & 0x0F == 0x0A,
            0x2000..=0x2FFF => self.rom_bank = (self.rom_bank & 0x100) | value as u16,
            _ => self.rom_bank = (self.rom_bank & 0xFF) | (((value & 0x01) as u16) << 8),
        }
    }

    fn write_rom_hi(&mut self, offset: u16, value: u8) {
        if offset < 0x2000 {
            self.ram_bank = value & 0x0F;
        }
    }

    fn write_ram(&mut self, offset: u16, value: u8) {
        if self.ram_enabled {
            let bank = self.ram_bank as usize;
            banked_write(&mut self.ram, bank, RAM_BANK_SIZE, offset, value);
        }
    }

    fn save(&self) {
        if let Some(save) = &self.save {
            save.store(&self.ram);
        }
    }
}

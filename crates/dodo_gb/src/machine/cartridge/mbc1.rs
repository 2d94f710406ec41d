use super::{banked_read, banked_write, restore_ram, Mapper, SaveFile, RAM_BANK_SIZE, ROM_BANK_SIZE};

/// MBC1 controller.
///
/// The 5-bit bank register and the 2-bit secondary register combine into
/// the ROM bank mapped at 0x4000. In RAM banking mode (mode 1) the
/// secondary register selects the external RAM bank instead of bank 0.
pub(in super::super) struct Mbc1 {
    rom: Vec<u8>,
    ram: Vec<u8>,
    ram_enabled: bool,
    /// Low five ROM bank bits, never zero.
    bank_lo: u8,
    /// Bits 5-6 of the ROM bank, or the RAM bank in mode 1.
    bank_hi: u8,
    mode: u8,
    save: Option<SaveFile>,
}

impl Mbc1 {
    pub(super) fn new(rom: Vec<u8>, ram_size: usize, save: Option<SaveFile>) -> Self {
        let mut ram = vec![0; ram_size];
        if let Some(saved) = save.as_ref().and_then(SaveFile::load) {
            restore_ram(&mut ram, &saved);
        }
        Self {
            rom,
            ram,
            ram_enabled: false,
            bank_lo: 1,
            bank_hi: 0,
            mode: 0,
            save,
        }
    }

    fn rom_bank(&self) -> usize {
        ((self.bank_hi as usize) << 5) | self.bank_lo as usize
    }

    fn ram_bank(&self) -> usize {
        if self.mode == 1 {
            self.bank_hi as usize
        } else {
            0
        }
    }
}

impl Mapper for Mbc1 {
    fn read_rom_lo(&self, addr: u16) -> u8 {
        banked_read(&self.rom, 0, ROM_BANK_SIZE, addr)
    }

    fn read_rom_hi(&self, offset: u16) -> u8 {
        banked_read(&self.rom, self.rom_bank(), ROM_BANK_SIZE, offset)
    }

    fn read_ram(&self, offset: u16) -> u8 {
        if !self.ram_enabled {
            return 0xFF;
        }
        banked_read(&self.ram, self.ram_bank(), RAM_BANK_SIZE, offset)
    }

    fn write_rom_lo(&mut self, addr: u16, value: u8) {
        match addr {
            0x0000..=0x1FFF => self.ram_enabled = value & 0x0F == 0x0A,
            _ => {
                self.bank_lo = value & 0x1F;
                if self.bank_lo == 0 {
                    self.bank_lo = 1;
                }
            }
        }
    }

    fn write_rom_hi(&mut self, offset: u16, value: u8) {
        match offset {
            0x0000..=0x1FFF => self.bank_hi = value & 0x03,
            _ => self.mode = value & 0x01,
        }
    }

    fn write_ram(&mut self, offset: u16, value: u8) {
        if self.ram_enabled {
            let bank = self.ram_bank();
            banked_write(&mut self.ram, bank, RAM_BANK_SIZE, offset, value);
        }
    }

    fn save(&self) {
        if let Some(save) = &self.save {
            save.store(&self.ram);
        }
    }
}

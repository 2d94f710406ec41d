use super::{banked_read, banked_write, Mapper, RAM_BANK_SIZE, ROM_BANK_SIZE};

/// Plain 32 KiB cartridge without a bank controller.
pub(in super::super) struct Mbc0 {
    rom: Vec<u8>,
    ram: Vec<u8>,
}

impl Mbc0 {
    pub(super) fn new(rom: Vec<u8>, ram_size: usize) -> Self {
        Self {
            rom,
            ram: vec![0; ram_size],
        }
    }
}

impl Mapper for Mbc0 {
    fn read_rom_lo(&self, addr: u16) -> u8 {
        banked_read(&self.rom, 0, ROM_BANK_SIZE, addr)
    }

    fn read_rom_hi(&self, offset: u16) -> u8 {
        banked_read(&self.rom, 1, ROM_BANK_SIZE, offset)
    }

    fn read_ram(&self, offset: u16) -> u8 {
        banked_read(&self.ram, 0, RAM_BANK_SIZE, offset)
    }

    fn write_rom_lo(&mut self, _addr: u16, _value: u8) {}

    fn write_rom_hi(&mut self, _offset: u16, _value: u8) {}

    fn write_ram(&mut self, offset: u16, value: u8) {
        banked_write(&mut self.ram, 0, RAM_BANK_SIZE, offset, value);
    }
}

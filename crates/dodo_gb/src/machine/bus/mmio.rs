mod read;
mod write;

use super::{GameboyBus, WRAM_BANK_SIZE};

impl GameboyBus {
    pub(super) fn read8_mmio(&self, addr: u16) -> u8 {
        self.read8_mmio_impl(addr)
    }

    pub(super) fn write8_mmio(&mut self, addr: u16, value: u8) {
        self.write8_mmio_impl(addr, value)
    }

    /// Bank mapped at 0xD000: SVBK in CGB mode (0 selects 1), else 1.
    fn wram_switchable_bank(&self) -> usize {
        if self.cgb {
            ((self.wram_bank & 0x07) as usize).max(1)
        } else {
            1
        }
    }

    /// WRAM array index for an address in 0xC000-0xDFFF.
    fn wram_index(&self, addr: u16) -> usize {
        let offset = (addr & 0x0FFF) as usize;
        if addr < 0xD000 {
            offset
        } else {
            self.wram_switchable_bank() * WRAM_BANK_SIZE + offset
        }
    }
}

use crate::cpu::Bus;

use super::GameboyBus;

impl Bus for GameboyBus {
    fn read8(&mut self, addr: u16) -> u8 {
        self.read8_mmio(addr)
    }

    fn write8(&mut self, addr: u16, value: u8) {
        self.write8_mmio(addr, value)
    }

    fn triggered_interrupts(&mut self) -> u8 {
        self.ie_reg & self.if_reg & 0x1F
    }

    fn clear_interrupt(&mut self, bit: u8) {
        self.if_reg &= !(1 << bit);
    }

    fn switch_speed(&mut self) -> bool {
        GameboyBus::switch_speed(self)
    }
}

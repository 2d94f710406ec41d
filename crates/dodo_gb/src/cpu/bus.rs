/// Abstraction over the memory map seen by the CPU.
///
/// Only byte reads and writes are required. The interrupt helpers default
/// to going through the IE (0xFFFF) and IF (0xFF0F) registers, which is
/// enough for flat test memories; the system bus overrides them to skip
/// the address decoder.
pub trait Bus {
    fn read8(&mut self, addr: u16) -> u8;
    fn write8(&mut self, addr: u16, value: u8);

    /// Interrupts that are both requested and enabled (`IE & IF`).
    fn triggered_interrupts(&mut self) -> u8 {
        self.read8(0xFFFF) & self.read8(0xFF0F) & 0x1F
    }

    /// Acknowledge a single interrupt by clearing its IF bit.
    fn clear_interrupt(&mut self, bit: u8) {
        let iflags = self.read8(0xFF0F);
        self.write8(0xFF0F, iflags & !(1 << bit));
    }

    /// Perform a CGB speed switch if one was armed through KEY1.
    ///
    /// Returns true when the speed actually changed. Buses without a
    /// double-speed mode never switch.
    fn switch_speed(&mut self) -> bool {
        false
    }
}

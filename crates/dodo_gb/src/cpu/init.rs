use super::{Cpu, CpuRegister, Registers};

impl Default for Cpu {
    fn default() -> Self {
        Self::new()
    }
}

impl Cpu {
    pub fn new() -> Self {
        let mut cpu = Self {
            regs: Registers::default(),
            ime: false,
            halted: false,
            halt_bug: false,
            ime_enable_pending: false,
            ime_enable_delay: false,
            locked: false,
            branch_taken: false,
        };
        cpu.reset(false);
        cpu
    }

    /// Reset to the register state the boot ROM leaves behind when it
    /// hands control to the cartridge at 0x0100.
    ///
    /// A is 0x11 on CGB hardware, which is how games detect the console.
    pub fn reset(&mut self, cgb: bool) {
        self.regs = Registers {
            af: CpuRegister::new(if cgb { 0x11B0 } else { 0x01B0 }),
            bc: CpuRegister::new(0x0013),
            de: CpuRegister::new(0x00D8),
            hl: CpuRegister::new(0x014D),
            sp: 0xFFFE,
            pc: 0x0100,
        };
        self.ime = false;
        self.halted = false;
        self.halt_bug = false;
        self.ime_enable_pending = false;
        self.ime_enable_delay = false;
        self.locked = false;
        self.branch_taken = false;
    }
}

use crate::cpu::{Bus, Cpu};

impl Cpu {
    pub(super) fn exec_halt<B: Bus>(&mut self, bus: &mut B) {
        if !self.ime && bus.triggered_interrupts() != 0 {
            // HALT bug: with IME clear and an interrupt already pending the
            // CPU does not halt, and the next opcode byte is read twice.
            self.halt_bug = true;
            return;
        }
        self.halted = true;
    }

    pub(super) fn exec_stop<B: Bus>(&mut self, bus: &mut B) {
        // STOP is a 2-byte instruction; the padding byte is discarded.
        let _padding = self.fetch8(bus);

        if bus.switch_speed() {
            log::debug!("CPU speed switch at PC=0x{:04X}", self.regs.pc);
        }
    }

    pub(super) fn exec_di(&mut self) {
        self.ime = false;
        self.ime_enable_pending = false;
        self.ime_enable_delay = false;
    }

    pub(super) fn exec_ei(&mut self) {
        // IME becomes 1 after the *next* instruction completes.
        self.ime_enable_pending = true;
    }
}

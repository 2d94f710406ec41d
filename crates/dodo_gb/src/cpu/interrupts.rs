use super::{Bus, Cpu};

/// Machine cycles charged for dispatching an interrupt.
pub(super) const INTERRUPT_CYCLES: u32 = 5;

impl Cpu {
    /// Service the highest-priority pending interrupt if IME is set.
    ///
    /// Returns the cycles consumed when an interrupt was taken.
    pub(super) fn handle_interrupts<B: Bus>(&mut self, bus: &mut B) -> Option<u32> {
        if !self.ime {
            return None;
        }
        let pending = bus.triggered_interrupts();
        if pending == 0 {
            return None;
        }

        // VBlank > STAT > Timer > Serial > Joypad.
        let bit = pending.trailing_zeros() as u8;
        self.service_interrupt(bus, bit);
        Some(INTERRUPT_CYCLES)
    }

    /// Acknowledge interrupt `bit`, push PC and jump to its vector.
    pub(super) fn service_interrupt<B: Bus>(&mut self, bus: &mut B, bit: u8) {
        assert!(bit <= 4, "interrupt bit {bit} out of range");

        self.ime = false;
        self.halted = false;
        bus.clear_interrupt(bit);

        let pc = self.regs.pc;
        let vector = 0x0040 + bit as u16 * 8;
        self.push_u16(bus, pc);
        self.regs.pc = vector;

        log::debug!(
            "CPU interrupt: idx={} vector=0x{:04X} pc=0x{:04X} sp=0x{:04X}",
            bit,
            vector,
            pc,
            self.regs.sp,
        );
    }

    /// Apply the delayed IME change requested by EI.
    #[inline]
    pub(super) fn apply_ime_delay(&mut self) {
        if self.ime_enable_delay {
            // Second step after EI: actually enable IME.
            self.ime = true;
            self.ime_enable_delay = false;
        } else if self.ime_enable_pending {
            // First step after EI (EI itself): arm the delayed enable.
            self.ime_enable_pending = false;
            self.ime_enable_delay = true;
        }
    }
}

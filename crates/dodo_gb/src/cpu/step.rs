use super::timing::{CB_CYCLES, OPCODE_CYCLES, OPCODE_CYCLES_BRANCHED};
use super::{Bus, Cpu};

impl Cpu {
    /// Execute a single instruction, service one interrupt, or idle one
    /// cycle while halted. Returns the machine cycles consumed.
    pub fn step<B: Bus>(&mut self, bus: &mut B) -> u32 {
        if self.locked {
            return 1;
        }

        if let Some(cycles) = self.handle_interrupts(bus) {
            return cycles;
        }

        if self.halted {
            // Any pending interrupt ends HALT, even with IME clear; it is
            // only vectored when IME is set.
            if bus.triggered_interrupts() == 0 {
                return 1;
            }
            self.halted = false;
        }

        let opcode = self.fetch8(bus);
        self.branch_taken = false;

        let cycles = if opcode == 0xCB {
            let cb = self.step_cb(bus);
            OPCODE_CYCLES[0xCB] + CB_CYCLES[cb as usize]
        } else {
            self.exec_opcode(bus, opcode);
            if self.branch_taken {
                OPCODE_CYCLES_BRANCHED[opcode as usize]
            } else {
                OPCODE_CYCLES[opcode as usize]
            }
        };

        self.apply_ime_delay();
        cycles as u32
    }
}

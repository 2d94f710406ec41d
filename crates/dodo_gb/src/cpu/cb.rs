use super::{Bus, Cpu, Flag};

impl Cpu {
    /// Execute a CB-prefixed instruction (rotates, shifts, BIT, RES, SET).
    ///
    /// Returns the CB opcode so the caller can look up its timing.
    pub(super) fn step_cb<B: Bus>(&mut self, bus: &mut B) -> u8 {
        let cb = self.fetch8(bus);
        let x = cb >> 6;
        let y = (cb >> 3) & 0x07;
        let z = cb & 0x07;

        match x {
            0 => {
                let value = self.read_reg8(bus, z);
                let carry_in = self.get_flag(Flag::C);
                let (result, carry_out) = match y {
                    // RLC
                    0 => (value.rotate_left(1), value & 0x80 != 0),
                    // RRC
                    1 => (value.rotate_right(1), value & 0x01 != 0),
                    // RL
                    2 => ((value << 1) | u8::from(carry_in), value & 0x80 != 0),
                    // RR
                    3 => ((value >> 1) | (u8::from(carry_in) << 7), value & 0x01 != 0),
                    // SLA
                    4 => (value << 1, value & 0x80 != 0),
                    // SRA keeps bit 7.
                    5 => ((value >> 1) | (value & 0x80), value & 0x01 != 0),
                    // SWAP
                    6 => (value.rotate_left(4), false),
                    // SRL
                    _ => (value >> 1, value & 0x01 != 0),
                };

                self.clear_flags();
                self.set_flag(Flag::Z, result == 0);
                self.set_flag(Flag::C, carry_out);
                self.write_reg8(bus, z, result);
            }
            1 => {
                // BIT b, r: C preserved, H set, N cleared.
                let value = self.read_reg8(bus, z);
                self.set_flag(Flag::Z, value & (1 << y) == 0);
                self.set_flag(Flag::N, false);
                self.set_flag(Flag::H, true);
            }
            2 => {
                // RES b, r
                let value = self.read_reg8(bus, z) & !(1 << y);
                self.write_reg8(bus, z, value);
            }
            _ => {
                // SET b, r
                let value = self.read_reg8(bus, z) | (1 << y);
                self.write_reg8(bus, z, value);
            }
        }

        cb
    }
}

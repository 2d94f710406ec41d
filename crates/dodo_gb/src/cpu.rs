mod alu;
mod bus;
mod cb;
mod exec;
mod helpers;
mod init;
mod interrupts;
mod regs;
mod step;
mod timing;

pub use bus::Bus;
pub use regs::{CpuRegister, Registers};

/// Flag bits in the F register.
///
/// Only the upper nibble of F is backed by hardware; the lower four bits
/// always read as zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flag {
    Z = 7,
    N = 6,
    H = 5,
    C = 4,
}

/// SM83 CPU core (the LR35902 found in the DMG and CGB).
///
/// `step` executes one instruction at a time against any [`Bus`] and
/// reports the machine cycles it consumed; the caller is responsible for
/// advancing the rest of the system by that amount.
#[derive(Clone, Debug)]
pub struct Cpu {
    pub regs: Registers,
    pub ime: bool,
    pub halted: bool,
    halt_bug: bool,
    ime_enable_pending: bool,
    ime_enable_delay: bool,
    /// Set once an unused opcode has been executed. The real CPU hangs
    /// until power-off; we keep idling one machine cycle per step.
    locked: bool,
    /// Whether the conditional branch of the instruction being executed
    /// was taken. Selects between the two primary cycle tables.
    branch_taken: bool,
}

impl Cpu {
    #[inline]
    pub fn get_flag(&self, flag: Flag) -> bool {
        let bit = flag as u8;
        (self.regs.f() & (1 << bit)) != 0
    }

    #[inline]
    pub fn set_flag(&mut self, flag: Flag, value: bool) {
        let bit = flag as u8;
        let f = self.regs.f();
        if value {
            self.regs.set_f(f | (1 << bit));
        } else {
            self.regs.set_f(f & !(1 << bit));
        }
    }

    #[inline]
    pub fn clear_flags(&mut self) {
        self.regs.set_f(0);
    }

    /// Whether the CPU hit an unused opcode and stopped executing.
    pub fn is_locked(&self) -> bool {
        self.locked
    }
}

#[cfg(test)]
mod tests;

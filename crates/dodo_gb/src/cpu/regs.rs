/// A 16-bit register pair that can also be addressed as two 8-bit halves.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CpuRegister {
    pub hi: u8,
    pub lo: u8,
}

impl CpuRegister {
    #[inline]
    pub const fn new(value: u16) -> Self {
        let [hi, lo] = value.to_be_bytes();
        Self { hi, lo }
    }

    #[inline]
    pub fn get(&self) -> u16 {
        u16::from_be_bytes([self.hi, self.lo])
    }

    #[inline]
    pub fn set(&mut self, value: u16) {
        let [hi, lo] = value.to_be_bytes();
        self.hi = hi;
        self.lo = lo;
    }
}

/// Register file of the SM83 core.
///
/// AF, BC, DE and HL are stored as pairs; SP and PC are only ever used as
/// 16-bit values.
#[derive(Clone, Copy, Debug, Default)]
pub struct Registers {
    pub af: CpuRegister,
    pub bc: CpuRegister,
    pub de: CpuRegister,
    pub hl: CpuRegister,
    pub sp: u16,
    pub pc: u16,
}

impl Registers {
    #[inline]
    pub fn a(&self) -> u8 {
        self.af.hi
    }

    #[inline]
    pub fn set_a(&mut self, value: u8) {
        self.af.hi = value;
    }

    #[inline]
    pub fn f(&self) -> u8 {
        self.af.lo
    }

    #[inline]
    pub fn set_f(&mut self, value: u8) {
        // Lower 4 bits of F are always zero.
        self.af.lo = value & 0xF0;
    }

    #[inline]
    pub fn af(&self) -> u16 {
        self.af.get()
    }

    #[inline]
    pub fn set_af(&mut self, value: u16) {
        self.af.set(value & 0xFFF0);
    }

    #[inline]
    pub fn bc(&self) -> u16 {
        self.bc.get()
    }

    #[inline]
    pub fn set_bc(&mut self, value: u16) {
        self.bc.set(value);
    }

    #[inline]
    pub fn de(&self) -> u16 {
        self.de.get()
    }

    #[inline]
    pub fn set_de(&mut self, value: u16) {
        self.de.set(value);
    }

    #[inline]
    pub fn hl(&self) -> u16 {
        self.hl.get()
    }

    #[inline]
    pub fn set_hl(&mut self, value: u16) {
        self.hl.set(value);
    }

    /// Read a 16-bit pair by its `rp` opcode index (0=BC, 1=DE, 2=HL, 3=SP).
    #[inline]
    pub(crate) fn rp(&self, index: u8) -> u16 {
        match index & 0x03 {
            0 => self.bc(),
            1 => self.de(),
            2 => self.hl(),
            _ => self.sp,
        }
    }

    #[inline]
    pub(crate) fn set_rp(&mut self, index: u8, value: u16) {
        match index & 0x03 {
            0 => self.set_bc(value),
            1 => self.set_de(value),
            2 => self.set_hl(value),
            _ => self.sp = value,
        }
    }
}

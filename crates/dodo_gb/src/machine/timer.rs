/// Timer / divider unit.
///
/// DIV free-runs at CPU clock / 256. When enabled through TAC, TIMA counts
/// at one of four rates and reloads from TMA on overflow, requesting the
/// timer interrupt.
pub(super) struct Timer {
    /// DIV (FF04).
    div: u8,
    /// CPU ticks accumulated towards the next DIV increment.
    div_ticks: u32,
    /// TIMA (FF05).
    tima: u8,
    /// TMA (FF06).
    tma: u8,
    /// TAC (FF07), lower 3 bits.
    tac: u8,
    /// CPU ticks accumulated towards the next TIMA increment.
    tima_ticks: u32,
}

/// TIMA period in CPU ticks, indexed by TAC[1:0].
const TIMA_PERIODS: [u32; 4] = [1024, 16, 64, 256];
const DIV_PERIOD: u32 = 256;

impl Timer {
    pub(super) fn new() -> Self {
        Self {
            div: 0,
            div_ticks: 0,
            tima: 0,
            tma: 0,
            tac: 0,
            tima_ticks: 0,
        }
    }

    #[inline]
    fn enabled(&self) -> bool {
        self.tac & 0x04 != 0
    }

    /// Advance by `ticks` CPU ticks. Returns true when TIMA overflowed.
    pub(super) fn tick(&mut self, ticks: u32) -> bool {
        self.div_ticks += ticks;
        while self.div_ticks >= DIV_PERIOD {
            self.div_ticks -= DIV_PERIOD;
            self.div = self.div.wrapping_add(1);
        }

        if !self.enabled() {
            return false;
        }

        let period = TIMA_PERIODS[(self.tac & 0x03) as usize];
        let mut overflowed = false;
        self.tima_ticks += ticks;
        while self.tima_ticks >= period {
            self.tima_ticks -= period;
            let (next, overflow) = self.tima.overflowing_add(1);
            if overflow {
                self.tima = self.tma;
                overflowed = true;
            } else {
                self.tima = next;
            }
        }
        overflowed
    }

    pub(super) fn read(&self, addr: u16) -> u8 {
        match addr {
            0xFF04 => self.div,
            0xFF05 => self.tima,
            0xFF06 => self.tma,
            0xFF07 => 0xF8 | self.tac,
            _ => 0,
        }
    }

    pub(super) fn write(&mut self, addr: u16, value: u8) {
        match addr {
            // Any write resets the whole divider chain.
            0xFF04 => {
                self.div = 0;
                self.div_ticks = 0;
                self.tima_ticks = 0;
            }
            0xFF05 => self.tima = value,
            0xFF06 => self.tma = value,
            0xFF07 => self.tac = value & 0x07,
            _ => {}
        }
    }
}

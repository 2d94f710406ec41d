use std::time::{SystemTime, UNIX_EPOCH};

const SECS_PER_DAY: u64 = 86_400;
const DAY_LIMIT: u64 = 512;

/// Register indices within the RTC file (selected as 0x08-0x0C).
const SECONDS: usize = 0;
const MINUTES: usize = 1;
const HOURS: usize = 2;
const DAY_LOW: usize = 3;
const DAY_HIGH: usize = 4;

const DH_DAY_BIT8: u8 = 0x01;
const DH_HALT: u8 = 0x40;
const DH_CARRY: u8 = 0x80;

/// Serialized size: five registers followed by the base as a u64.
pub(super) const RTC_SAVE_LEN: usize = 13;

/// MBC3 real-time clock.
///
/// The clock is kept as an epoch `base` in wall-clock seconds; the
/// registers hold the value observed at the last latch. Elapsed time is
/// `now - base`, so the clock keeps running while the emulator is closed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(super) struct Rtc {
    regs: [u8; 5],
    base: u64,
}

/// Wall-clock seconds since the Unix epoch.
pub(super) fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

impl Rtc {
    pub(super) fn new(now: u64) -> Self {
        Self {
            regs: [0; 5],
            base: now,
        }
    }

    fn halted(&self) -> bool {
        self.regs[DAY_HIGH] & DH_HALT != 0
    }

    fn days(&self) -> u64 {
        (((self.regs[DAY_HIGH] & DH_DAY_BIT8) as u64) << 8) | self.regs[DAY_LOW] as u64
    }

    /// Seconds represented by the current register values.
    fn total_seconds(&self) -> u64 {
        self.days() * SECS_PER_DAY
            + self.regs[HOURS] as u64 * 3600
            + self.regs[MINUTES] as u64 * 60
            + self.regs[SECONDS] as u64
    }

    /// Snapshot the running clock into the registers. A halted clock keeps
    /// its registers.
    pub(super) fn latch(&mut self, now: u64) {
        if self.halted() {
            return;
        }

        let elapsed = now.saturating_sub(self.base);
        let mut days = elapsed / SECS_PER_DAY;
        let rem = elapsed % SECS_PER_DAY;

        let mut flags = self.regs[DAY_HIGH] & DH_CARRY;
        if days >= DAY_LIMIT {
            flags |= DH_CARRY;
            days %= DAY_LIMIT;
        }

        self.regs[SECONDS] = (rem % 60) as u8;
        self.regs[MINUTES] = ((rem / 60) % 60) as u8;
        self.regs[HOURS] = (rem / 3600) as u8;
        self.regs[DAY_LOW] = days as u8;
        self.regs[DAY_HIGH] = flags | ((days >> 8) as u8 & DH_DAY_BIT8);

        if elapsed / SECS_PER_DAY >= DAY_LIMIT {
            // Keep the counter wrapped so the next latch starts below 512 days.
            self.base = now - self.total_seconds();
        }
    }

    /// Register `reg` (0-4) as last latched or written.
    pub(super) fn read(&self, reg: usize) -> u8 {
        self.regs.get(reg).copied().unwrap_or(0xFF)
    }

    /// Store a register and move the base so the clock continues from the
    /// written value.
    pub(super) fn write(&mut self, reg: usize, value: u8, now: u64) {
        let masked = match reg {
            SECONDS | MINUTES => value & 0x3F,
            HOURS => value & 0x1F,
            DAY_LOW => value,
            DAY_HIGH => value & (DH_DAY_BIT8 | DH_HALT | DH_CARRY),
            _ => return,
        };
        self.regs[reg] = masked;
        self.base = now.saturating_sub(self.total_seconds());
    }

    pub(super) fn to_bytes(&self) -> [u8; RTC_SAVE_LEN] {
        let mut out = [0u8; RTC_SAVE_LEN];
        out[..5].copy_from_slice(&self.regs);
        out[5..].copy_from_slice(&self.base.to_le_bytes());
        out
    }

    pub(super) fn from_bytes(data: &[u8]) -> Option<Self> {
        if data.len() != RTC_SAVE_LEN {
            return None;
        }
        let mut regs = [0u8; 5];
        regs.copy_from_slice(&data[..5]);
        let mut base = [0u8; 8];
        base.copy_from_slice(&data[5..]);
        Some(Self {
            regs,
            base: u64::from_le_bytes(base),
        })
    }
}

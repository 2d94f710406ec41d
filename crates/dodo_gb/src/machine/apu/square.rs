/// Duty waveforms, most significant bit first.
const DUTY_PATTERNS: [u8; 4] = [0b0000_0001, 0b1000_0001, 0b1000_0111, 0b0111_1110];

const MAX_LENGTH: u8 = 64;
const MAX_FREQUENCY: u16 = 2048;
/// Dots per frequency timer unit.
const DOTS_PER_UNIT: u32 = 4;

const LENGTH_ENABLE: u8 = 0b0100_0000;
const TRIGGER: u8 = 0b1000_0000;
const ENVELOPE_UP: u8 = 0b0000_1000;
const SWEEP_DOWN: u8 = 0b0000_1000;

/// Square wave channel (channel 1 with frequency sweep, channel 2 without).
#[derive(Debug)]
pub(super) struct SquareChannel {
    has_sweep: bool,

    /// NR10: sweep pace, direction and shift (channel 1 only).
    sweep_reg: u8,
    /// NRx1: duty and initial length.
    duty_length: u8,
    /// NRx2: initial volume, envelope direction and pace.
    envelope_reg: u8,
    /// NRx3: frequency low bits.
    freq_lo: u8,
    /// NRx4: trigger, length enable and frequency high bits.
    freq_hi: u8,

    enabled: bool,
    frequency_timer: u32,
    duty_step: u8,
    length: u8,
    volume: u8,
    envelope_timer: u8,

    shadow_frequency: u16,
    sweep_timer: u8,
    sweep_enabled: bool,
}

impl SquareChannel {
    pub(super) fn new(has_sweep: bool) -> Self {
        Self {
            has_sweep,
            sweep_reg: 0,
            duty_length: 0,
            envelope_reg: 0,
            freq_lo: 0,
            freq_hi: 0,
            enabled: false,
            frequency_timer: 0,
            duty_step: 0,
            length: 0,
            volume: 0,
            envelope_timer: 0,
            shadow_frequency: 0,
            sweep_timer: 0,
            sweep_enabled: false,
        }
    }

    pub(super) fn enabled(&self) -> bool {
        self.enabled
    }

    fn dac_on(&self) -> bool {
        self.envelope_reg & 0xF8 != 0
    }

    fn frequency(&self) -> u16 {
        (((self.freq_hi & 0x07) as u16) << 8) | self.freq_lo as u16
    }

    fn timer_period(&self) -> u32 {
        (MAX_FREQUENCY - self.frequency()) as u32 * DOTS_PER_UNIT
    }

    /// Advance the frequency timer by `dots`, stepping the duty position on
    /// each reload.
    pub(super) fn tick(&mut self, dots: u32) {
        let mut remaining = dots;
        while remaining > 0 {
            if self.frequency_timer == 0 {
                self.frequency_timer = self.timer_period();
            }
            let step = remaining.min(self.frequency_timer);
            self.frequency_timer -= step;
            remaining -= step;
            if self.frequency_timer == 0 {
                self.frequency_timer = self.timer_period();
                self.duty_step = (self.duty_step + 1) % 8;
            }
        }
    }

    pub(super) fn tick_length(&mut self) {
        if self.freq_hi & LENGTH_ENABLE == 0 || self.length == 0 {
            return;
        }
        self.length -= 1;
        if self.length == 0 {
            self.enabled = false;
        }
    }

    pub(super) fn tick_envelope(&mut self) {
        let pace = self.envelope_reg & 0x07;
        if pace == 0 || self.envelope_timer == 0 {
            return;
        }
        self.envelope_timer -= 1;
        if self.envelope_timer > 0 {
            return;
        }
        self.envelope_timer = pace;
        if self.envelope_reg & ENVELOPE_UP != 0 {
            if self.volume < 0x0F {
                self.volume += 1;
            }
        } else {
            self.volume = self.volume.saturating_sub(1);
        }
    }

    pub(super) fn tick_sweep(&mut self) {
        if !self.has_sweep || self.sweep_timer == 0 {
            return;
        }
        self.sweep_timer -= 1;
        if self.sweep_timer > 0 {
            return;
        }

        let pace = (self.sweep_reg >> 4) & 0x07;
        self.sweep_timer = if pace == 0 { 8 } else { pace };
        if !self.sweep_enabled || pace == 0 {
            return;
        }

        let next = self.next_sweep_frequency();
        if next > 0x7FF {
            self.enabled = false;
            return;
        }
        if self.sweep_reg & 0x07 != 0 {
            self.shadow_frequency = next;
            self.freq_lo = next as u8;
            self.freq_hi = (self.freq_hi & 0xF8) | ((next >> 8) as u8 & 0x07);
            // Second overflow check with the new value, without write-back.
            if self.next_sweep_frequency() > 0x7FF {
                self.enabled = false;
            }
        }
    }

    fn next_sweep_frequency(&self) -> u16 {
        let delta = self.shadow_frequency >> (self.sweep_reg & 0x07);
        if self.sweep_reg & SWEEP_DOWN != 0 {
            self.shadow_frequency.wrapping_sub(delta)
        } else {
            self.shadow_frequency + delta
        }
    }

    fn trigger(&mut self) {
        self.enabled = self.dac_on();
        if self.length == 0 {
            self.length = MAX_LENGTH;
        }
        self.frequency_timer = self.timer_period();
        self.envelope_timer = self.envelope_reg & 0x07;
        self.volume = self.envelope_reg >> 4;

        if self.has_sweep {
            let pace = (self.sweep_reg >> 4) & 0x07;
            let shift = self.sweep_reg & 0x07;
            self.shadow_frequency = self.frequency();
            self.sweep_timer = if pace == 0 { 8 } else { pace };
            self.sweep_enabled = pace != 0 || shift != 0;
            if shift != 0 && self.next_sweep_frequency() > 0x7FF {
                self.enabled = false;
            }
        }
    }

    /// Current amplitude, 0-15.
    pub(super) fn output(&self) -> u8 {
        if !self.enabled || !self.dac_on() {
            return 0;
        }
        let pattern = DUTY_PATTERNS[(self.duty_length >> 6) as usize];
        let high = (pattern >> (7 - self.duty_step)) & 1;
        high * self.volume
    }

    /// Read NRx0-NRx4 (`reg` 0-4) with write-only bits set.
    pub(super) fn read(&self, reg: u16) -> u8 {
        match reg {
            0 if self.has_sweep => self.sweep_reg | 0x80,
            1 => self.duty_length | 0x3F,
            2 => self.envelope_reg,
            4 => self.freq_hi | 0xBF,
            _ => 0xFF,
        }
    }

    pub(super) fn write(&mut self, reg: u16, value: u8) {
        match reg {
            0 if self.has_sweep => self.sweep_reg = value & 0x7F,
            1 => {
                self.duty_length = value;
                self.length = MAX_LENGTH - (value & 0x3F);
            }
            2 => {
                self.envelope_reg = value;
                if !self.dac_on() {
                    self.enabled = false;
                }
            }
            3 => self.freq_lo = value,
            4 => {
                self.freq_hi = value & !TRIGGER;
                if value & TRIGGER != 0 {
                    self.trigger();
                }
            }
            _ => {}
        }
    }
}

use crate::{CPU_CLOCK_HZ, SAMPLE_RATE};

mod square;

use square::SquareChannel;

/// Frame sequencer period in dots (512 Hz).
const FRAME_SEQUENCER_PERIOD: u32 = 8192;
/// Loudest possible mix of the two square channels.
const MIX_SCALE: f32 = 30.0;

/// Audio processing unit.
///
/// Only the two square channels produce sound. The wave and noise channel
/// registers are kept so games can read them back.
pub(super) struct Apu {
    square1: SquareChannel,
    square2: SquareChannel,
    /// NR30-NR34.
    wave_regs: [u8; 5],
    /// NR41-NR44.
    noise_regs: [u8; 4],
    wave_ram: [u8; 16],
    nr50: u8,
    nr51: u8,
    powered: bool,

    frame_dots: u32,
    frame_step: u8,
    /// Dots scaled by the sample rate; one sample per `CPU_CLOCK_HZ`.
    sample_clock: u64,
    samples: Vec<f32>,
}

impl Apu {
    pub(super) fn new() -> Self {
        Self {
            square1: SquareChannel::new(true),
            square2: SquareChannel::new(false),
            wave_regs: [0; 5],
            noise_regs: [0; 4],
            wave_ram: [0; 16],
            nr50: 0,
            nr51: 0,
            powered: false,
            frame_dots: 0,
            frame_step: 0,
            sample_clock: 0,
            samples: Vec::new(),
        }
    }

    /// Register state after the boot ROM.
    pub(super) fn reset(&mut self) {
        *self = Self::new();
        self.write(0xFF26, 0xF1);
        const DEFAULTS: [(u16, u8); 20] = [
            (0xFF10, 0x80),
            (0xFF11, 0xBF),
            (0xFF12, 0xF3),
            (0xFF13, 0xFF),
            (0xFF14, 0xBF),
            (0xFF16, 0x3F),
            (0xFF17, 0x00),
            (0xFF18, 0xFF),
            (0xFF19, 0xBF),
            (0xFF1A, 0x7F),
            (0xFF1B, 0xFF),
            (0xFF1C, 0x9F),
            (0xFF1D, 0xFF),
            (0xFF1E, 0xBF),
            (0xFF20, 0xFF),
            (0xFF21, 0x00),
            (0xFF22, 0x00),
            (0xFF23, 0xBF),
            (0xFF24, 0x77),
            (0xFF25, 0xF3),
        ];
        for (addr, value) in DEFAULTS {
            self.write(addr, value);
        }
    }

    /// Advance by `dots` (undivided clock) and collect output samples.
    ///
    /// Channels run only up to the next sample point before each sample is
    /// taken, so long ticks still capture the waveform.
    pub(super) fn tick(&mut self, dots: u32) {
        let rate = SAMPLE_RATE as u64;
        let clock = CPU_CLOCK_HZ as u64;

        let mut remaining = dots;
        while remaining > 0 {
            let to_sample = (clock - self.sample_clock).div_ceil(rate);
            let step = remaining.min(to_sample as u32);
            remaining -= step;

            self.run_channels(step);

            self.sample_clock += step as u64 * rate;
            if self.sample_clock >= clock {
                self.sample_clock -= clock;
                let mix = self.square1.output() as f32 + self.square2.output() as f32;
                self.samples.push(mix / MIX_SCALE);
            }
        }
    }

    fn run_channels(&mut self, dots: u32) {
        if !self.powered {
            return;
        }
        self.square1.tick(dots);
        self.square2.tick(dots);

        self.frame_dots += dots;
        while self.frame_dots >= FRAME_SEQUENCER_PERIOD {
            self.frame_dots -= FRAME_SEQUENCER_PERIOD;
            self.step_frame_sequencer();
        }
    }

    fn step_frame_sequencer(&mut self) {
        if self.frame_step % 2 == 0 {
            self.square1.tick_length();
            self.square2.tick_length();
        }
        if self.frame_step == 2 || self.frame_step == 6 {
            self.square1.tick_sweep();
        }
        if self.frame_step == 7 {
            self.square1.tick_envelope();
            self.square2.tick_envelope();
        }
        self.frame_step = (self.frame_step + 1) % 8;
    }

    /// Drain the samples produced since the last call.
    pub(super) fn take_samples(&mut self) -> Vec<f32> {
        std::mem::take(&mut self.samples)
    }

    pub(super) fn read(&self, addr: u16) -> u8 {
        match addr {
            0xFF10..=0xFF14 => self.square1.read(addr - 0xFF10),
            0xFF16..=0xFF19 => self.square2.read(addr - 0xFF15),
            0xFF1A => self.wave_regs[0] | 0x7F,
            0xFF1C => self.wave_regs[2] | 0x9F,
            0xFF1E => self.wave_regs[4] | 0xBF,
            0xFF21 => self.noise_regs[1],
            0xFF22 => self.noise_regs[2],
            0xFF23 => self.noise_regs[3] | 0xBF,
            0xFF24 => self.nr50,
            0xFF25 => self.nr51,
            0xFF26 => {
                let mut status = 0x70;
                if self.powered {
                    status |= 0x80;
                }
                if self.square1.enabled() {
                    status |= 0x01;
                }
                if self.square2.enabled() {
                    status |= 0x02;
                }
                status
            }
            0xFF30..=0xFF3F => self.wave_ram[(addr - 0xFF30) as usize],
            // Write-only registers and the unused slots.
            _ => 0xFF,
        }
    }

    pub(super) fn write(&mut self, addr: u16, value: u8) {
        match addr {
            0xFF26 => self.write_nr52(value),
            0xFF30..=0xFF3F => self.wave_ram[(addr - 0xFF30) as usize] = value,
            _ if !self.powered => {}
            0xFF10..=0xFF14 => self.square1.write(addr - 0xFF10, value),
            0xFF16..=0xFF19 => self.square2.write(addr - 0xFF15, value),
            0xFF1A..=0xFF1E => self.wave_regs[(addr - 0xFF1A) as usize] = value,
            0xFF20..=0xFF23 => self.noise_regs[(addr - 0xFF20) as usize] = value,
            0xFF24 => self.nr50 = value,
            0xFF25 => self.nr51 = value,
            _ => {}
        }
    }

    fn write_nr52(&mut self, value: u8) {
        let on = value & 0x80 != 0;
        if self.powered && !on {
            // Powering off clears every channel and control register.
            self.square1 = SquareChannel::new(true);
            self.square2 = SquareChannel::new(false);
            self.wave_regs = [0; 5];
            self.noise_regs = [0; 4];
            self.nr50 = 0;
            self.nr51 = 0;
        }
        if !self.powered && on {
            self.frame_step = 0;
            self.frame_dots = 0;
        }
        self.powered = on;
    }
}

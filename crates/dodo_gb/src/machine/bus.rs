use super::apu::Apu;
use super::cartridge::Mbc;
use super::ppu::{Frame, Ppu};
use super::serial::Serial;
use super::timer::Timer;
use super::Interrupt;

mod dma;
mod init;
mod joypad;
mod mmio;
mod traits;

use dma::Hdma;

const WRAM_SIZE: usize = 0x8000;
const WRAM_BANK_SIZE: usize = 0x1000;
const HRAM_SIZE: usize = 0x7F;

/// System bus: routes CPU accesses to their owners and advances the
/// peripherals in lockstep with the CPU.
pub(crate) struct GameboyBus {
    /// Installed cartridge controller, if any.
    mbc: Option<Mbc>,
    ppu: Ppu,
    timer: Timer,
    apu: Apu,
    serial: Serial,

    /// Eight 4 KiB banks; bank 0 is fixed at 0xC000.
    wram: [u8; WRAM_SIZE],
    hram: [u8; HRAM_SIZE],
    /// SVBK (FF70), low three bits.
    wram_bank: u8,

    pub(crate) if_reg: u8,
    pub(crate) ie_reg: u8,

    cgb: bool,
    /// KEY1 bit 7.
    double_speed: bool,
    /// KEY1 bit 0: armed by software, consumed by STOP.
    speed_switch_prepare: bool,
    hdma: Hdma,
    /// FF46 as last written.
    oam_dma_source: u8,

    /// P1 select bits 5-4 as last written.
    joyp_select: u8,
    /// Active-low masks (bit clear = pressed): A/B/Select/Start and
    /// Right/Left/Up/Down.
    joyp_action: u8,
    joyp_direction: u8,
}

impl Default for GameboyBus {
    fn default() -> Self {
        Self::new()
    }
}

impl GameboyBus {
    pub(crate) fn new() -> Self {
        Self {
            mbc: None,
            ppu: Ppu::new(),
            timer: Timer::new(),
            apu: Apu::new(),
            serial: Serial::default(),
            wram: [0; WRAM_SIZE],
            hram: [0; HRAM_SIZE],
            wram_bank: 0,
            if_reg: 0,
            ie_reg: 0,
            cgb: false,
            double_speed: false,
            speed_switch_prepare: false,
            hdma: Hdma::default(),
            oam_dma_source: 0xFF,
            joyp_select: 0x30,
            joyp_action: 0x0F,
            joyp_direction: 0x0F,
        }
    }

    /// Install a cartridge controller, dropping (and flushing) the old one.
    pub(super) fn load_mbc(&mut self, mbc: Mbc) {
        self.mbc = Some(mbc);
    }

    /// Persist the installed cartridge's battery data without removing it.
    pub(super) fn flush_cartridge(&self) {
        if let Some(mbc) = &self.mbc {
            mbc.flush();
        }
    }

    pub(crate) fn is_cgb(&self) -> bool {
        self.cgb
    }

    pub(crate) fn is_double_speed(&self) -> bool {
        self.double_speed
    }

    pub(super) fn lcd_on(&self) -> bool {
        self.ppu.read(0xFF40) & 0x80 != 0
    }

    pub(super) fn frame(&self) -> &Frame {
        self.ppu.frame()
    }

    pub(super) fn take_audio_samples(&mut self) -> Vec<f32> {
        self.apu.take_samples()
    }

    pub(super) fn serial_output(&self) -> &[u8] {
        self.serial.output()
    }

    pub(super) fn request_interrupt(&mut self, interrupt: Interrupt) {
        self.if_reg |= interrupt.bits();
    }

    /// Advance the peripherals after the CPU spent `cycles` T-cycles.
    ///
    /// Returns true when V-blank started during this call.
    pub(crate) fn tick(&mut self, cycles: u32) -> bool {
        let mult = if self.double_speed { 2 } else { 1 };
        let dma_dots = self.progress_dma();
        let ppu_dots = cycles / mult + dma_dots;
        let cpu_ticks = cycles + dma_dots * mult;

        if self.timer.tick(cpu_ticks) {
            self.request_interrupt(Interrupt::TIMER);
        }

        let irq = self.ppu.tick(ppu_dots);
        self.apu.tick(ppu_dots);
        self.if_reg |= irq;

        irq & Interrupt::VBLANK.bits() != 0
    }

    /// Toggle CPU speed if KEY1 was armed. Called when STOP executes.
    pub(crate) fn switch_speed(&mut self) -> bool {
        if !self.speed_switch_prepare {
            return false;
        }
        self.speed_switch_prepare = false;
        self.double_speed = !self.double_speed;
        log::debug!(
            "switched to {} speed",
            if self.double_speed { "double" } else { "normal" }
        );
        true
    }
}

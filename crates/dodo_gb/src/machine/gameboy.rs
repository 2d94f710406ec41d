use std::fs;
use std::path::Path;

use crate::cpu::Cpu;

use super::cartridge::{save_path_for, CartridgeError, Mbc};
use super::{Buttons, Frame, GameboyBus};

/// Dots in one full LCD frame (154 lines of 456 dots).
const DOTS_PER_FRAME: u32 = 70_224;

/// A complete Game Boy / Game Boy Color.
///
/// Owns the CPU and the bus; the cartridge is installed with
/// [`Gameboy::load_cartridge`] and the machine is then driven one
/// instruction ([`Gameboy::step`]) or one frame ([`Gameboy::step_frame`])
/// at a time.
pub struct Gameboy {
    pub cpu: Cpu,
    pub(crate) bus: GameboyBus,
}

impl Default for Gameboy {
    fn default() -> Self {
        Self::new()
    }
}

impl Gameboy {
    pub fn new() -> Self {
        Self {
            cpu: Cpu::new(),
            bus: GameboyBus::new(),
        }
    }

    /// Execute one CPU step and advance the rest of the machine by the
    /// same amount of time. Returns true when a frame was completed.
    pub fn step(&mut self) -> bool {
        let cycles = self.cpu.step(&mut self.bus);
        self.bus.tick(cycles * 4)
    }

    /// Run until the next V-blank. With the LCD off, stop after one
    /// frame's worth of cycles instead.
    pub fn step_frame(&mut self) {
        let mut elapsed = 0u32;
        loop {
            let cycles = self.cpu.step(&mut self.bus) * 4;
            if self.bus.tick(cycles) {
                return;
            }
            // Frame length is measured in dots, which run at half the CPU
            // rate in double speed.
            elapsed += if self.bus.is_double_speed() { cycles / 2 } else { cycles };
            if !self.bus.lcd_on() && elapsed >= DOTS_PER_FRAME {
                return;
            }
        }
    }

    /// Load a ROM file. Battery RAM is restored from and saved to the same
    /// path with a `.sav` extension.
    ///
    /// On error the running machine is left untouched.
    pub fn load_cartridge(&mut self, path: impl AsRef<Path>) -> Result<(), CartridgeError> {
        let path = path.as_ref();
        let rom = fs::read(path).map_err(|source| CartridgeError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.load_cartridge_bytes(rom, Some(&save_path_for(path)))
    }

    /// Load a ROM image from memory. `save_path`, when given, is the
    /// battery save file used by carts that have one.
    pub fn load_cartridge_bytes(
        &mut self,
        rom: Vec<u8>,
        save_path: Option<&Path>,
    ) -> Result<(), CartridgeError> {
        // The new controller restores from disk, which may be the file the
        // current one writes to.
        self.bus.flush_cartridge();
        let (mbc, header) = Mbc::new(rom, save_path)?;
        log::debug!(
            "installed cartridge type {:#04x}, {} KiB RAM, {}",
            header.cart_type,
            header.ram_size / 1024,
            if header.cgb { "CGB" } else { "DMG" }
        );

        self.bus.load_mbc(mbc);
        self.bus.reset(header.cgb);
        self.cpu.reset(header.cgb);
        Ok(())
    }

    /// Back to the post-boot state, keeping the cartridge.
    pub fn reset(&mut self) {
        let cgb = self.bus.is_cgb();
        self.bus.reset(cgb);
        self.cpu.reset(cgb);
    }

    /// Set both joypad groups from active-low masks (bit clear = pressed):
    /// bit 3 Down/Start, bit 2 Up/Select, bit 1 Left/B, bit 0 Right/A.
    pub fn set_buttons_pressed(&mut self, action: u8, direction: u8) {
        self.bus.set_buttons_pressed(action, direction);
    }

    /// Set the joypad state from the buttons currently held.
    pub fn set_buttons(&mut self, pressed: Buttons) {
        self.set_buttons_pressed(pressed.action_mask(), pressed.direction_mask());
    }

    /// Last rendered frame, RGB555 per pixel.
    pub fn frame(&self) -> &Frame {
        self.bus.frame()
    }

    /// Audio samples in [0, 1] produced since the previous call.
    pub fn take_audio_buffer(&mut self) -> Vec<f32> {
        self.bus.take_audio_samples()
    }

    /// Every byte sent over the link port so far.
    pub fn serial_output(&self) -> &[u8] {
        self.bus.serial_output()
    }

    /// Whether the loaded cartridge runs in CGB mode.
    pub fn is_cgb(&self) -> bool {
        self.bus.is_cgb()
    }
}

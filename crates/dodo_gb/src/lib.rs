pub mod cpu;
pub mod machine;

pub use machine::{Buttons, CartridgeError, Gameboy, Interrupt};

/// Logical screen width in pixels.
pub const SCREEN_WIDTH: usize = 160;
/// Logical screen height in pixels.
pub const SCREEN_HEIGHT: usize = 144;
/// Base CPU clock in T-cycles per second (single speed).
pub const CPU_CLOCK_HZ: u32 = 4_194_304;
/// Output sample rate of the audio buffer returned by `Gameboy::take_audio_buffer`.
pub const SAMPLE_RATE: u32 = 44_100;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use dodo_gb::{Gameboy, SCREEN_HEIGHT, SCREEN_WIDTH};

const USAGE: &str = "Usage: dodo <rom_path> [frames] [out_rgb24_path]";

/// Expand a 5-bit colour channel to 8 bits.
fn expand5(value: u16) -> u8 {
    let v = (value & 0x1F) as u8;
    (v << 3) | (v >> 2)
}

/// Convert the RGB555 framebuffer into packed RGB24.
fn frame_rgb24(gb: &Gameboy) -> Vec<u8> {
    let mut buffer = Vec::with_capacity(SCREEN_WIDTH * SCREEN_HEIGHT * 3);
    for &pixel in gb.frame().iter().flatten() {
        buffer.push(expand5(pixel));
        buffer.push(expand5(pixel >> 5));
        buffer.push(expand5(pixel >> 10));
    }
    buffer
}

fn main() -> Result<()> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let Some(rom_path) = args.next().map(PathBuf::from) else {
        bail!(USAGE);
    };
    let frames: u32 = match args.next() {
        Some(arg) => arg
            .parse()
            .with_context(|| format!("invalid frame count '{arg}'\n{USAGE}"))?,
        None => 120,
    };
    let out_path = args.next().map(PathBuf::from);

    let mut gb = Gameboy::new();
    gb.load_cartridge(&rom_path)
        .with_context(|| format!("could not load '{}'", rom_path.display()))?;
    log::info!(
        "running '{}' in {} mode for {frames} frames",
        rom_path.display(),
        if gb.is_cgb() { "CGB" } else { "DMG" }
    );

    let mut samples = 0;
    for _ in 0..frames {
        gb.step_frame();
        samples += gb.take_audio_buffer().len();
    }
    log::debug!("produced {samples} audio samples");

    let serial = gb.serial_output();
    if !serial.is_empty() {
        println!("{}", String::from_utf8_lossy(serial));
    }

    if let Some(out_path) = out_path {
        let buffer = frame_rgb24(&gb);
        std::fs::write(&out_path, &buffer)
            .with_context(|| format!("failed to write '{}'", out_path.display()))?;
        println!(
            "Wrote {} bytes ({}x{} rgb24) after {} frames to '{}'",
            buffer.len(),
            SCREEN_WIDTH,
            SCREEN_HEIGHT,
            frames,
            out_path.display()
        );
    }

    Ok(())
}

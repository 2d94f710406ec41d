use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

mod mbc0;
mod mbc1;
mod mbc3;
mod mbc5;
mod rtc;
mod save;

use mbc0::Mbc0;
use mbc1::Mbc1;
use mbc3::Mbc3;
use mbc5::Mbc5;
use save::SaveFile;

pub(super) use save::save_path_for;

const ROM_BANK_SIZE: usize = 0x4000;
const RAM_BANK_SIZE: usize = 0x2000;

/// Errors raised while loading a cartridge image.
///
/// A failed load leaves the running machine untouched.
#[derive(Error, Debug)]
pub enum CartridgeError {
    #[error("failed to read ROM {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("File too small ({len} bytes)")]
    TooSmall { len: usize },

    #[error("Unimplemented MBC type: {0:x}")]
    Unimplemented(u8),

    #[error("Invalid MBC type: {0:x}")]
    Invalid(u8),

    #[error("Invalid RAM size code: {0:x}")]
    InvalidRamSize(u8),
}

/// The header fields the loader cares about.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) struct Header {
    pub(super) cart_type: u8,
    pub(super) ram_size: usize,
    pub(super) cgb: bool,
}

impl Header {
    pub(super) fn parse(rom: &[u8]) -> Result<Self, CartridgeError> {
        if rom.len() < 0x150 {
            return Err(CartridgeError::TooSmall { len: rom.len() });
        }

        let ram_code = rom[0x149];
        let ram_size = match ram_code {
            0x00 | 0x01 => 0,
            0x02 => 0x2000,
            0x03 => 0x8000,
            0x04 => 0x20000,
            0x05 => 0x10000,
            code => return Err(CartridgeError::InvalidRamSize(code)),
        };

        Ok(Self {
            cart_type: rom[0x147],
            ram_size,
            cgb: rom[0x143] & 0x80 != 0,
        })
    }

    fn has_battery(&self) -> bool {
        matches!(self.cart_type, 0x03 | 0x0F | 0x10 | 0x13 | 0x1B | 0x1E)
    }

    fn has_rtc(&self) -> bool {
        matches!(self.cart_type, 0x0F | 0x10)
    }
}

/// Operations every memory bank controller implements.
///
/// `read_rom_lo` receives the raw address (0x0000-0x3FFF); the other
/// methods receive the offset into their window.
trait Mapper {
    fn read_rom_lo(&self, addr: u16) -> u8;
    fn read_rom_hi(&self, offset: u16) -> u8;
    fn read_ram(&self, offset: u16) -> u8;
    fn write_rom_lo(&mut self, addr: u16, value: u8);
    fn write_rom_hi(&mut self, offset: u16, value: u8);
    fn write_ram(&mut self, offset: u16, value: u8);

    /// Persist battery-backed state, if any.
    fn save(&self) {}
}

/// The installed memory bank controller.
pub(super) enum Mbc {
    Rom(Mbc0),
    Mbc1(Mbc1),
    Mbc3(Mbc3),
    Mbc5(Mbc5),
}

impl Mbc {
    /// Build the controller described by the ROM header.
    ///
    /// `save_path` is where battery RAM (and the MBC3 clock) is restored from
    /// and written back to; it is ignored for carts without a battery.
    pub(super) fn new(rom: Vec<u8>, save_path: Option<&Path>) -> Result<(Self, Header), CartridgeError> {
        let header = Header::parse(&rom)?;
        let save = if header.has_battery() {
            save_path.map(SaveFile::new)
        } else {
            None
        };

        let mbc = match header.cart_type {
            0x00 => Mbc::Rom(Mbc0::new(rom, header.ram_size)),
            0x01..=0x03 => Mbc::Mbc1(Mbc1::new(rom, header.ram_size, save)),
            0x0F..=0x13 => Mbc::Mbc3(Mbc3::new(rom, header.ram_size, header.has_rtc(), save)),
            0x19..=0x1E => Mbc::Mbc5(Mbc5::new(rom, header.ram_size, save)),
            0x05 | 0x06 | 0x08 | 0x09 | 0x0B | 0x0C | 0x0D | 0x20 | 0x22 | 0xFC..=0xFF => {
                return Err(CartridgeError::Unimplemented(header.cart_type));
            }
            other => return Err(CartridgeError::Invalid(other)),
        };
        Ok((mbc, header))
    }

    fn as_mapper(&self) -> &dyn Mapper {
        match self {
            Mbc::Rom(m) => m,
            Mbc::Mbc1(m) => m,
            Mbc::Mbc3(m) => m,
            Mbc::Mbc5(m) => m,
        }
    }

    fn as_mapper_mut(&mut self) -> &mut dyn Mapper {
        match self {
            Mbc::Rom(m) => m,
            Mbc::Mbc1(m) => m,
            Mbc::Mbc3(m) => m,
            Mbc::Mbc5(m) => m,
        }
    }

    pub(super) fn read(&self, addr: u16) -> u8 {
        let mapper = self.as_mapper();
        match addr {
            0x0000..=0x3FFF => mapper.read_rom_lo(addr),
            0x4000..=0x7FFF => mapper.read_rom_hi(addr - 0x4000),
            0xA000..=0xBFFF => mapper.read_ram(addr - 0xA000),
            _ => 0,
        }
    }

    pub(super) fn write(&mut self, addr: u16, value: u8) {
        let mapper = self.as_mapper_mut();
        match addr {
            0x0000..=0x3FFF => mapper.write_rom_lo(addr, value),
            0x4000..=0x7FFF => mapper.write_rom_hi(addr - 0x4000, value),
            0xA000..=0xBFFF => mapper.write_ram(addr - 0xA000, value),
            _ => {}
        }
    }

    /// Write battery-backed state to the save file, if the cart has one.
    pub(super) fn flush(&self) {
        self.as_mapper().save();
    }
}

impl Drop for Mbc {
    fn drop(&mut self) {
        self.flush();
    }
}

/// Byte at `offset` inside bank `bank`, wrapped to the buffer length.
#[inline]
fn banked_read(buf: &[u8], bank: usize, bank_size: usize, offset: u16) -> u8 {
    if buf.is_empty() {
        return 0xFF;
    }
    buf[(bank * bank_size + offset as usize) % buf.len()]
}

#[inline]
fn banked_write(buf: &mut [u8], bank: usize, bank_size: usize, offset: u16, value: u8) {
    if buf.is_empty() {
        return;
    }
    let index = (bank * bank_size + offset as usize) % buf.len();
    buf[index] = value;
}

/// Copy a restored save image over freshly allocated RAM.
fn restore_ram(ram: &mut [u8], saved: &[u8]) {
    for (dst, src) in ram.iter_mut().zip(saved) {
        *dst = *src;
    }
}

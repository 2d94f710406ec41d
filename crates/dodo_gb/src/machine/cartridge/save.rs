use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Battery save file next to the ROM.
#[derive(Clone, Debug)]
pub(in super::super) struct SaveFile {
    path: PathBuf,
}

impl SaveFile {
    pub(super) fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    /// Contents of the save file. A missing file is not an error.
    pub(super) fn load(&self) -> Option<Vec<u8>> {
        match fs::read(&self.path) {
            Ok(data) => {
                log::debug!("restored {} bytes from {}", data.len(), self.path.display());
                Some(data)
            }
            Err(err) if err.kind() == ErrorKind::NotFound => None,
            Err(err) => {
                log::warn!("failed to read save file {}: {err}", self.path.display());
                None
            }
        }
    }

    pub(super) fn store(&self, data: &[u8]) {
        if let Err(err) = fs::write(&self.path, data) {
            log::warn!("failed to write save file {}: {err}", self.path.display());
        }
    }
}

/// Save path used for a ROM loaded from disk.
pub(in super::super) fn save_path_for(rom_path: &Path) -> PathBuf {
    rom_path.with_extension("sav")
}

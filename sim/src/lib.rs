// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Host simulator support for the electronic purse card
//!
//! Card EEPROM is persisted to an image file between invocations, each
//! invocation of the simulator being one power cycle of the card.

use std::path::{Path, PathBuf};

use log::debug;

use bourse_core::{
    engine::{balance, owner},
    storage::{MemStorage, Storage, PENDING_COUNT, PENDING_STATE, RETRY_COUNTER, STORAGE_SIZE},
    transaction::{pending, PendingState},
};

mod helpers;
pub use helpers::HexData;

/// Simulator errors
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    /// Image file IO error
    #[error("image IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Image file is not a card image
    #[error("invalid image size (expected {expected} bytes, found {actual})")]
    ImageSize { expected: usize, actual: usize },
}

/// Card storage backed by an image file.
///
/// The image is loaded on open and written back by [FileStorage::save].
#[derive(Clone, Debug)]
pub struct FileStorage {
    path: PathBuf,
    mem: MemStorage,
}

impl FileStorage {
    /// Create a new, erased, image at `path` (not written until saved)
    pub fn create(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            mem: MemStorage::new(),
        }
    }

    /// Load an existing image
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SimError> {
        let path = path.as_ref();
        let data = std::fs::read(path)?;

        if data.len() != STORAGE_SIZE {
            return Err(SimError::ImageSize {
                expected: STORAGE_SIZE,
                actual: data.len(),
            });
        }

        debug!("loaded image from {}", path.display());

        Ok(Self {
            path: path.to_path_buf(),
            mem: MemStorage::from_image(&data),
        })
    }

    /// Write the image back to its file
    pub fn save(&self) -> Result<(), SimError> {
        std::fs::write(&self.path, self.mem.image())?;

        debug!("saved image to {}", self.path.display());

        Ok(())
    }

    /// Image file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Raw image
    pub fn image(&self) -> &[u8; STORAGE_SIZE] {
        self.mem.image()
    }
}

impl Storage for FileStorage {
    fn read(&self, addr: usize) -> u8 {
        self.mem.read(addr)
    }

    fn write(&mut self, addr: usize, value: u8) {
        self.mem.write(addr, value)
    }
}

/// Describe the persisted fields of a card image
pub fn describe<S: Storage>(s: &S) -> String {
    let state = match pending(s) {
        PendingState::Full => "full",
        PendingState::Empty => "empty",
    };

    let owner = match owner::read(s) {
        Ok(o) => format!("{:?}", String::from_utf8_lossy(&o)),
        Err(_) => "unset".to_string(),
    };

    let [c0, c1] = balance::ciphertext(s);

    format!(
        "pending:  {} ({:02x}), {} op(s)\n\
         owner:    {}\n\
         balance:  {:08x} {:08x} (encrypted)\n\
         retries:  {}",
        state,
        s.read(PENDING_STATE),
        s.read(PENDING_COUNT),
        owner,
        c0,
        c1,
        s.read(RETRY_COUNTER),
    )
}

//! Overwrite-before-unlink file removal.

use std::fs::{self, OpenOptions};
use std::io::{Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use rand::RngCore;

const CHUNK_SIZE: usize = 64 * 1024;

/// Errors that can occur while erasing a file.
#[derive(Debug)]
pub enum SecureEraseError {
    /// The file does not exist.
    NotFound(PathBuf),
    /// File I/O error.
    IoError(std::io::Error),
}

impl std::fmt::Display for SecureEraseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SecureEraseError::NotFound(path) => write!(f, "File not found: {}", path.display()),
            SecureEraseError::IoError(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for SecureEraseError {}

impl From<std::io::Error> for SecureEraseError {
    fn from(e: std::io::Error) -> Self {
        SecureEraseError::IoError(e)
    }
}

/// Overwrites a file in place with random bytes `passes` times, then removes it.
///
/// Each pass is synced to disk before the next begins. At least one pass is
/// always made. The file keeps its length, so no old bytes survive past the
/// new end of file.
pub fn secure_erase(path: &Path, passes: u32) -> Result<(), SecureEraseError> {
    let mut file = match OpenOptions::new().write(true).open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(SecureEraseError::NotFound(path.to_path_buf()));
        }
        Err(e) => return Err(e.into()),
    };

    let len = file.metadata()?.len();
    let mut rng = rand::thread_rng();
    let mut buf = vec![0u8; CHUNK_SIZE.min(len as usize).max(1)];

    for _ in 0..passes.max(1) {
        file.seek(SeekFrom::Start(0))?;

        let mut remaining = len;
        while remaining > 0 {
            let n = buf.len().min(remaining as usize);
            rng.fill_bytes(&mut buf[..n]);
            file.write_all(&buf[..n])?;
            remaining -= n as u64;
        }

        file.sync_all()?;
    }

    drop(file);
    fs::remove_file(path)?;
    Ok(())
}

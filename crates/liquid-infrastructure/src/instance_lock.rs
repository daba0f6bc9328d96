//! Single instance per app.
//!
//! The first process to launch an app holds an exclusive lock on
//! `<runtime>/<AppName>.lock` for its lifetime. A later launch finds the lock
//! taken, drops a `<AppName>.raise` marker for the holder to notice, and exits.
//!
//! The lock file outlives its holder. Unlinking it would let a process that
//! already opened the old file lock it while another locks a fresh one.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

use fs2::FileExt;
use liquid_core::app::AppName;
use liquid_core::error::{LiquidError, Result};
use tracing::{debug, info, warn};

use crate::paths::LiquidPaths;

/// Outcome of trying to become the running instance of an app.
#[derive(Debug)]
pub enum InstanceClaim {
    /// This process owns the app until the guard is dropped.
    Primary(InstanceLock),
    /// Another process already runs the app and was asked to raise itself.
    Secondary,
}

/// Guard for the per-app lock.
///
/// Dropping it removes the raise marker and releases the lock, on every exit
/// path that unwinds.
#[derive(Debug)]
pub struct InstanceLock {
    file: File,
    raise_path: PathBuf,
}

impl InstanceLock {
    /// Tries to take the lock for `app`.
    ///
    /// # Returns
    ///
    /// - `Ok(InstanceClaim::Primary)`: lock acquired
    /// - `Ok(InstanceClaim::Secondary)`: lock held elsewhere; raise requested
    /// - `Err(LiquidError::Lock)`: the lock file could not be opened or locked
    pub fn claim(paths: &LiquidPaths, app: &AppName) -> Result<InstanceClaim> {
        let lock_path = paths.lock_file(app);
        let raise_path = paths.raise_file(app);

        fs::create_dir_all(paths.runtime_dir()).map_err(|e| {
            LiquidError::Lock(format!(
                "Failed to create runtime directory '{}': {}",
                paths.runtime_dir().display(),
                e
            ))
        })?;

        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)
            .map_err(|e| {
                LiquidError::Lock(format!(
                    "Failed to open lock file '{}': {}",
                    lock_path.display(),
                    e
                ))
            })?;

        match file.try_lock_exclusive() {
            Ok(()) => {
                // Stale request from a previous run.
                let _ = fs::remove_file(&raise_path);

                if let Err(e) = file
                    .set_len(0)
                    .and_then(|()| writeln!(file, "{}", std::process::id()))
                {
                    debug!(
                        "[InstanceLock] Could not stamp pid into {}: {}",
                        lock_path.display(),
                        e
                    );
                }

                info!(app = %app, "[InstanceLock] Acquired {}", lock_path.display());
                Ok(InstanceClaim::Primary(Self { file, raise_path }))
            }
            Err(e) if e.kind() == fs2::lock_contended_error().kind() => {
                File::create(&raise_path).map_err(|e| {
                    LiquidError::Lock(format!("Failed to signal running instance: {}", e))
                })?;
                info!(app = %app, "[InstanceLock] Already running; raise requested");
                Ok(InstanceClaim::Secondary)
            }
            Err(e) => Err(LiquidError::Lock(format!(
                "Failed to lock '{}': {}",
                lock_path.display(),
                e
            ))),
        }
    }

    /// Consumes a pending raise request, if any.
    pub fn take_raise_request(&self) -> bool {
        match fs::remove_file(&self.raise_path) {
            Ok(()) => {
                debug!("[InstanceLock] Raise request received");
                true
            }
            Err(_) => false,
        }
    }
}

impl Drop for InstanceLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.raise_path);
        if let Err(e) = FileExt::unlock(&self.file) {
            warn!("[InstanceLock] Could not release lock: {}", e);
        }
    }
}

use tracing::{debug, warn};

use super::model::{AppName, AppRecord};
use crate::error::Result;

/// An abstract store for app records.
///
/// Implementations decide the on-disk layout. Every write is a full
/// replacement of the record, so a reader never observes a half-written file.
pub trait AppConfigRepository: Send + Sync {
    /// Loads an app record.
    ///
    /// # Returns
    ///
    /// - `Ok(record)`: the record, normalised so its invariants hold
    /// - `Err(ConfigNotFound)`: no record, an empty record, or one without a URL
    /// - `Err(ConfigCorrupt)`: the record exists but cannot be parsed
    fn load(&self, name: &AppName) -> Result<AppRecord>;

    /// Persists the record, replacing any previous version.
    fn save(&self, record: &AppRecord) -> Result<()>;

    /// Securely removes a record.
    ///
    /// Returns `Err(ConfigNotFound)` if there is nothing to remove.
    fn delete(&self, name: &AppName) -> Result<()>;

    fn exists(&self, name: &AppName) -> bool;

    /// Names of all stored apps, sorted case-insensitively.
    fn list_names(&self) -> Result<Vec<AppName>>;

    /// Saves during a session, where a failed write is degraded mode rather than fatal.
    ///
    /// The in-memory record stays authoritative; the failure is logged and
    /// reported through the return value only.
    fn save_or_warn(&self, record: &AppRecord, reason: &str) -> bool {
        match self.save(record) {
            Ok(()) => {
                debug!("[AppConfigStore] Saved '{}' ({})", record.name, reason);
                true
            }
            Err(e) => {
                warn!(
                    app = %record.name,
                    "[AppConfigStore] Failed to persist {}: {}. Continuing with in-memory state",
                    reason,
                    e
                );
                false
            }
        }
    }
}

//! Program-wide settings (`liquid.toml`).

use std::path::Path;
use std::time::Duration;

use liquid_core::session::SessionConfig;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::storage::{FileMode, TomlDocument, TomlFileError};
use crate::toml_app_repository::DEFAULT_ERASE_PASSES;

/// Settings shared by every app. All keys are optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LiquidSettings {
    /// `tracing` filter directive used when `RUST_LOG` is not set.
    pub log_filter: String,
    /// Overwrite passes when a record is deleted.
    pub secure_erase_passes: u32,
    pub fullscreen_settle_delay_ms: u64,
    pub geometry_save_delay_ms: u64,
}

impl Default for LiquidSettings {
    fn default() -> Self {
        Self {
            log_filter: "info".to_string(),
            secure_erase_passes: DEFAULT_ERASE_PASSES,
            fullscreen_settle_delay_ms: 200,
            geometry_save_delay_ms: 1000,
        }
    }
}

impl LiquidSettings {
    /// Loads settings; a missing or empty file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, TomlFileError> {
        Ok(Self::document(path).read()?.unwrap_or_default())
    }

    /// Loads settings, falling back to the defaults if the file is unreadable.
    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_else(|e| {
            warn!(
                "[Settings] Could not read {}: {}. Using defaults",
                path.display(),
                e
            );
            Self::default()
        })
    }

    pub fn save(&self, path: &Path) -> Result<(), TomlFileError> {
        Self::document(path).write(self)
    }

    fn document(path: &Path) -> TomlDocument<Self> {
        TomlDocument::new(path.to_path_buf(), FileMode::Shared)
    }

    pub fn erase_passes(&self) -> u32 {
        self.secure_erase_passes.max(1)
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            fullscreen_settle_delay: Duration::from_millis(self.fullscreen_settle_delay_ms),
            geometry_save_delay: Duration::from_millis(self.geometry_save_delay_ms),
        }
    }
}

//! Unified path management for Liquid files.
//!
//! Every file Liquid reads or writes is resolved here, so a single override
//! root (CLI flag or environment variable) relocates all of them.

use std::path::{Path, PathBuf};

use liquid_core::app::AppName;
use liquid_core::constants::PROGRAM_NAME;

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// The platform configuration directory could not be determined.
    ConfigDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::ConfigDirNotFound => write!(f, "Cannot find the configuration directory"),
        }
    }
}

impl std::error::Error for PathError {}

/// Resolved locations of Liquid's files.
///
/// # Directory Structure
///
/// ```text
/// ~/.config/liquid/            # Config directory
/// ├── liquid.toml              # Program settings
/// ├── apps/                    # One record per app
/// │   └── <AppName>.toml
/// └── logs/
///     └── liquid.log.YYYY-MM-DD
///
/// $XDG_RUNTIME_DIR/liquid/     # Runtime directory (falls back to the temp dir)
/// ├── <AppName>.lock           # Single-instance lock
/// └── <AppName>.raise          # Raise request from a second launch
/// ```
///
/// With an override root, the runtime directory becomes `<root>/run`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiquidPaths {
    config_dir: PathBuf,
    runtime_dir: PathBuf,
}

impl LiquidPaths {
    /// Environment variable that relocates the configuration root.
    pub const CONFIG_DIR_ENV: &'static str = "LIQUID_CONFIG_DIR";

    /// Resolves paths from an explicit root, the environment, or platform defaults.
    ///
    /// # Returns
    ///
    /// - `Ok(LiquidPaths)`: Resolved paths (nothing is created on disk)
    /// - `Err(PathError::ConfigDirNotFound)`: No override and no platform config dir
    pub fn resolve(override_root: Option<PathBuf>) -> Result<Self, PathError> {
        let from_env = std::env::var_os(Self::CONFIG_DIR_ENV)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);

        if let Some(root) = override_root.or(from_env) {
            return Ok(Self::with_root(root));
        }

        let config_dir = dirs::config_dir()
            .ok_or(PathError::ConfigDirNotFound)?
            .join(PROGRAM_NAME);
        let runtime_dir = dirs::runtime_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join(PROGRAM_NAME);

        Ok(Self {
            config_dir,
            runtime_dir,
        })
    }

    /// Places everything under `root`.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            runtime_dir: root.join("run"),
            config_dir: root,
        }
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Returns the path to the program settings file.
    pub fn settings_file(&self) -> PathBuf {
        self.config_dir.join("liquid.toml")
    }

    /// Returns the directory holding one TOML record per app.
    pub fn apps_dir(&self) -> PathBuf {
        self.config_dir.join("apps")
    }

    /// Returns the record file of `app`.
    ///
    /// # Security Note
    ///
    /// Records hold cookie values and proxy passwords; they are written
    /// with mode 600 on Unix.
    pub fn app_file(&self, app: &AppName) -> PathBuf {
        self.apps_dir().join(format!("{}.toml", app))
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.config_dir.join("logs")
    }

    pub fn runtime_dir(&self) -> &Path {
        &self.runtime_dir
    }

    pub fn lock_file(&self, app: &AppName) -> PathBuf {
        self.runtime_dir.join(format!("{}.lock", app))
    }

    pub fn raise_file(&self, app: &AppName) -> PathBuf {
        self.runtime_dir.join(format!("{}.raise", app))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_root_layout() {
        let paths = LiquidPaths::with_root("/tmp/liquid-test");
        let app = AppName::new("Mail").unwrap();

        assert!(paths.settings_file().ends_with("liquid-test/liquid.toml"));
        assert!(paths.app_file(&app).ends_with("apps/Mail.toml"));
        assert!(paths.logs_dir().ends_with("liquid-test/logs"));
        assert!(paths.lock_file(&app).ends_with("run/Mail.lock"));
        assert!(paths.raise_file(&app).ends_with("run/Mail.raise"));
    }

    #[test]
    fn test_explicit_root_wins() {
        let paths = LiquidPaths::resolve(Some(PathBuf::from("/opt/portable"))).unwrap();
        assert_eq!(paths.config_dir(), Path::new("/opt/portable"));
    }

    #[test]
    fn test_app_file_stays_inside_apps_dir() {
        let paths = LiquidPaths::with_root("/tmp/liquid-test");
        let app = AppName::new("../escape").unwrap();
        let file = paths.app_file(&app);
        assert_eq!(file.parent(), Some(paths.apps_dir().as_path()));
    }
}

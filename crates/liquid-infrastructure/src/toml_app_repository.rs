//! TOML-based app record repository.
//!
//! Stores each app as `apps/<AppName>.toml` under the configuration root.

use std::fs;
use std::path::PathBuf;

use liquid_core::app::{AppConfigRepository, AppName, AppRecord};
use liquid_core::error::{LiquidError, Result};
use tracing::{debug, info};

use crate::paths::LiquidPaths;
use crate::storage::{
    AppConfigDto, FileMode, SecureEraseError, TomlDocument, TomlFileError, secure_erase,
};

/// Default number of overwrite passes before a record is unlinked.
pub const DEFAULT_ERASE_PASSES: u32 = 5;

/// File-backed [`AppConfigRepository`].
///
/// # Features
///
/// - **Sparse**: only values that differ from their defaults are written
/// - **Atomic writes**: tmp file + fsync + rename, mode 600 on Unix
/// - **Secure delete**: records are overwritten with random bytes before unlink
pub struct TomlAppConfigRepository {
    apps_dir: PathBuf,
    erase_passes: u32,
}

impl TomlAppConfigRepository {
    pub fn new(paths: &LiquidPaths, erase_passes: u32) -> Self {
        Self {
            apps_dir: paths.apps_dir(),
            erase_passes: erase_passes.max(1),
        }
    }

    /// Creates a repository over an explicit directory.
    pub fn with_dir(apps_dir: PathBuf) -> Self {
        Self {
            apps_dir,
            erase_passes: DEFAULT_ERASE_PASSES,
        }
    }

    fn file_for(&self, name: &AppName) -> TomlDocument<AppConfigDto> {
        TomlDocument::new(
            self.apps_dir.join(format!("{}.toml", name)),
            FileMode::OwnerOnly,
        )
    }
}

impl AppConfigRepository for TomlAppConfigRepository {
    fn load(&self, name: &AppName) -> Result<AppRecord> {
        let file = self.file_for(name);

        let dto = match file.read() {
            Ok(Some(dto)) => dto,
            Ok(None) => return Err(LiquidError::not_found(name.as_str())),
            Err(TomlFileError::Parse { source, .. }) => {
                return Err(LiquidError::corrupt(name.as_str(), source.to_string()));
            }
            Err(e) => return Err(LiquidError::io(format!("Failed to read record: {}", e))),
        };

        let record = dto
            .into_record(name.clone())
            .ok_or_else(|| LiquidError::not_found(name.as_str()))?;

        debug!(
            app = %name,
            "[AppConfigStore] Loaded record with {} cookie(s)",
            record.cookies.len()
        );
        Ok(record)
    }

    fn save(&self, record: &AppRecord) -> Result<()> {
        let dto = AppConfigDto::from_record(record);
        self.file_for(&record.name)
            .write(&dto)
            .map_err(|e| LiquidError::persist(record.name.as_str(), e.to_string()))
    }

    fn delete(&self, name: &AppName) -> Result<()> {
        let file = self.file_for(name);

        secure_erase(file.path(), self.erase_passes).map_err(|e| match e {
            SecureEraseError::NotFound(_) => LiquidError::not_found(name.as_str()),
            SecureEraseError::IoError(io) => LiquidError::io(format!(
                "Failed to erase '{}': {}",
                file.path().display(),
                io
            )),
        })?;

        info!(
            app = %name,
            "[AppConfigStore] Record erased ({} pass(es))",
            self.erase_passes
        );
        Ok(())
    }

    fn exists(&self, name: &AppName) -> bool {
        self.file_for(name).path().is_file()
    }

    fn list_names(&self) -> Result<Vec<AppName>> {
        let entries = match fs::read_dir(&self.apps_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut names: Vec<AppName> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "toml"))
            .filter_map(|path| {
                let stem = path.file_stem()?.to_str()?;
                if stem.starts_with('.') {
                    return None;
                }
                AppName::new(stem).ok()
            })
            .collect();

        names.sort_by_cached_key(|n| n.as_str().to_lowercase());
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use liquid_core::app::Cookie;
    use tempfile::TempDir;

    fn repo() -> (TempDir, TomlAppConfigRepository) {
        let temp_dir = TempDir::new().unwrap();
        let repo = TomlAppConfigRepository::with_dir(temp_dir.path().join("apps"));
        (temp_dir, repo)
    }

    fn name(raw: &str) -> AppName {
        AppName::new(raw).unwrap()
    }

    #[test]
    fn test_save_and_load_record() {
        let (_temp_dir, repo) = repo();
        let mut record = AppRecord::new(name("mail"), "https://mail.example.com/");
        record.enable_js = true;
        record.set_allow_cookies(true);
        record.icon = Some(vec![0x89, 0x50, 0x4e, 0x47]);
        record
            .cookies
            .insert(Cookie::new("sid", "abc", ".example.com", "/"));

        repo.save(&record).unwrap();
        let loaded = repo.load(&name("mail")).unwrap();

        assert!(loaded.enable_js);
        assert!(loaded.allow_cookies());
        assert_eq!(loaded.icon, record.icon);
        assert_eq!(loaded.cookies.len(), 1);
        assert_eq!(loaded.cookies.iter().next().unwrap().value, "abc");
    }

    #[test]
    fn test_load_missing_record() {
        let (_temp_dir, repo) = repo();
        assert!(repo.load(&name("nothing")).unwrap_err().is_not_found());
    }

    #[test]
    fn test_load_record_without_url_is_not_found() {
        let (temp_dir, repo) = repo();
        let apps = temp_dir.path().join("apps");
        fs::create_dir_all(&apps).unwrap();
        fs::write(apps.join("blank.toml"), "EnableJS = true\n").unwrap();

        assert!(repo.load(&name("blank")).unwrap_err().is_not_found());
    }

    #[test]
    fn test_load_corrupt_record() {
        let (temp_dir, repo) = repo();
        let apps = temp_dir.path().join("apps");
        fs::create_dir_all(&apps).unwrap();
        fs::write(apps.join("broken.toml"), "URL = \"https://x.org\"\nEnableJS = \"yes\"\n").unwrap();

        let err = repo.load(&name("broken")).unwrap_err();
        assert!(err.is_corrupt());
        assert!(err.is_fatal_for_launch());
    }

    #[test]
    fn test_delete_record() {
        let (_temp_dir, repo) = repo();
        let record = AppRecord::new(name("mail"), "https://mail.example.com/");
        repo.save(&record).unwrap();
        assert!(repo.exists(&name("mail")));

        repo.delete(&name("mail")).unwrap();
        assert!(!repo.exists(&name("mail")));
        assert!(repo.delete(&name("mail")).unwrap_err().is_not_found());
    }

    #[test]
    fn test_list_names_sorted_case_insensitively() {
        let (_temp_dir, repo) = repo();
        assert!(repo.list_names().unwrap().is_empty());

        for raw in ["zeta", "Alpha", "beta"] {
            repo.save(&AppRecord::new(name(raw), "https://example.com/"))
                .unwrap();
        }

        let names: Vec<String> = repo
            .list_names()
            .unwrap()
            .into_iter()
            .map(|n| n.to_string())
            .collect();
        assert_eq!(names, vec!["Alpha", "beta", "zeta"]);
    }
}

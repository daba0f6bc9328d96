//! A single TOML document on disk, replaced as a whole on every write.
//!
//! The new contents are rendered into a hidden sibling (`.<name>.tmp`),
//! flushed, then renamed over the document. A crash leaves either the old
//! or the new document, never a mix.

use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;

/// Who may read the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileMode {
    /// Default permissions.
    Shared,
    /// `0600` on Unix. For documents holding cookies or passwords.
    OwnerOnly,
}

#[derive(Debug)]
pub enum TomlFileError {
    Io { path: PathBuf, source: std::io::Error },
    /// The file exists but is not a valid document of the expected shape.
    Parse { path: PathBuf, source: toml::de::Error },
    Render(toml::ser::Error),
}

impl TomlFileError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        TomlFileError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

impl std::fmt::Display for TomlFileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TomlFileError::Io { path, source } => write!(f, "{}: {}", path.display(), source),
            TomlFileError::Parse { path, source } => {
                write!(f, "{} is not valid: {}", path.display(), source)
            }
            TomlFileError::Render(e) => write!(f, "Cannot render document: {}", e),
        }
    }
}

impl std::error::Error for TomlFileError {}

/// Removes the temp file unless it was renamed into place.
struct PendingWrite {
    path: PathBuf,
    committed: bool,
}

impl Drop for PendingWrite {
    fn drop(&mut self) {
        if !self.committed {
            let _ = fs::remove_file(&self.path);
        }
    }
}

pub struct TomlDocument<T> {
    path: PathBuf,
    mode: FileMode,
    _shape: PhantomData<fn() -> T>,
}

impl<T: Serialize + DeserializeOwned> TomlDocument<T> {
    pub fn new(path: PathBuf, mode: FileMode) -> Self {
        Self {
            path,
            mode,
            _shape: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the document. A missing or blank file is `Ok(None)`.
    pub fn read(&self) -> Result<Option<T>, TomlFileError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(TomlFileError::io(&self.path, e)),
        };
        if text.trim().is_empty() {
            return Ok(None);
        }
        toml::from_str(&text)
            .map(Some)
            .map_err(|source| TomlFileError::Parse {
                path: self.path.clone(),
                source,
            })
    }

    /// Replaces the document with `value`, creating parent directories.
    pub fn write(&self, value: &T) -> Result<(), TomlFileError> {
        let text = toml::to_string_pretty(value).map_err(TomlFileError::Render)?;

        let (dir, file_name) = match (self.path.parent(), self.path.file_name()) {
            (Some(dir), Some(name)) => (dir, name.to_string_lossy()),
            _ => {
                return Err(TomlFileError::io(
                    &self.path,
                    std::io::Error::new(ErrorKind::InvalidInput, "not a file path"),
                ));
            }
        };
        fs::create_dir_all(dir).map_err(|e| TomlFileError::io(dir, e))?;

        let mut pending = PendingWrite {
            path: dir.join(format!(".{}.tmp", file_name)),
            committed: false,
        };
        // A leftover from a crashed write may carry the wrong mode.
        let _ = fs::remove_file(&pending.path);

        let mut file = self
            .open_temp(&pending.path)
            .map_err(|e| TomlFileError::io(&pending.path, e))?;
        file.write_all(text.as_bytes())
            .and_then(|()| file.sync_all())
            .map_err(|e| TomlFileError::io(&pending.path, e))?;
        drop(file);

        fs::rename(&pending.path, &self.path).map_err(|e| TomlFileError::io(&self.path, e))?;
        pending.committed = true;
        Ok(())
    }

    fn open_temp(&self, path: &Path) -> std::io::Result<File> {
        let mut options = OpenOptions::new();
        options.write(true).create_new(true);
        #[cfg(unix)]
        if self.mode == FileMode::OwnerOnly {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        options.open(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use tempfile::TempDir;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Window {
        title: String,
        zoom: f64,
    }

    fn sample() -> Window {
        Window {
            title: "Mail".to_string(),
            zoom: 1.25,
        }
    }

    #[test]
    fn test_write_creates_directories_and_reads_back() {
        let temp_dir = TempDir::new().unwrap();
        let doc = TomlDocument::<Window>::new(
            temp_dir.path().join("apps").join("mail.toml"),
            FileMode::Shared,
        );

        doc.write(&sample()).unwrap();
        assert_eq!(doc.read().unwrap(), Some(sample()));
        assert!(!temp_dir.path().join("apps").join(".mail.toml.tmp").exists());
    }

    #[test]
    fn test_missing_and_blank_read_as_none() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("mail.toml");
        let doc = TomlDocument::<Window>::new(path.clone(), FileMode::Shared);
        assert!(doc.read().unwrap().is_none());

        fs::write(&path, "\n\t \n").unwrap();
        assert!(doc.read().unwrap().is_none());
    }

    #[test]
    fn test_wrong_shape_is_parse_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("mail.toml");
        fs::write(&path, "title = 3\nzoom = 1.0\n").unwrap();

        let doc = TomlDocument::<Window>::new(path, FileMode::Shared);
        assert!(matches!(doc.read(), Err(TomlFileError::Parse { .. })));
    }

    #[test]
    fn test_stale_temp_file_does_not_block_write() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join(".mail.toml.tmp"), "garbage").unwrap();

        let doc = TomlDocument::<Window>::new(temp_dir.path().join("mail.toml"), FileMode::Shared);
        doc.write(&sample()).unwrap();
        assert_eq!(doc.read().unwrap(), Some(sample()));
    }

    #[cfg(unix)]
    #[test]
    fn test_owner_only_mode() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bank.toml");
        TomlDocument::<Window>::new(path.clone(), FileMode::OwnerOnly)
            .write(&sample())
            .unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}

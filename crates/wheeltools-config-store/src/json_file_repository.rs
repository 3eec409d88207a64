//! File implementation of the `ConfigRepository` trait.

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use tracing::debug;
use wheeltools_core::error::DomainError;
use wheeltools_core::repository::ConfigRepository;

/// Stores the configuration document as pretty-printed JSON in one file.
///
/// Saves write a sibling temporary file and rename it over the target, so a
/// crash mid-write leaves the previous document intact.
///
/// All I/O is blocking and runs under the roster store lock. The accrual tick
/// saves from the blocking pool; request handlers save inline.
#[derive(Debug, Clone)]
pub struct JsonFileConfigRepository {
    path: PathBuf,
}

impl JsonFileConfigRepository {
    /// Creates a repository for `path`. Nothing is read or written yet.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(std::ffi::OsStr::to_os_string)
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn write_atomically(&self, bytes: &[u8]) -> io::Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let temp = self.temp_path();
        let mut file = fs::File::create(&temp)?;
        file.write_all(bytes)?;
        file.sync_all()?;
        drop(file);
        fs::rename(&temp, &self.path)
    }
}

impl ConfigRepository for JsonFileConfigRepository {
    fn load(&self) -> Result<Option<serde_json::Value>, DomainError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no stored configuration");
                return Ok(None);
            }
            Err(e) => {
                return Err(DomainError::Infrastructure(format!(
                    "cannot read {}: {e}",
                    self.path.display()
                )));
            }
        };
        serde_json::from_str(&text).map(Some).map_err(|e| {
            DomainError::Infrastructure(format!("{} is not valid JSON: {e}", self.path.display()))
        })
    }

    fn save(&self, document: &serde_json::Value) -> Result<(), DomainError> {
        let bytes = serde_json::to_vec_pretty(document)
            .map_err(|e| DomainError::Infrastructure(format!("cannot encode configuration: {e}")))?;
        self.write_atomically(&bytes).map_err(|e| {
            DomainError::Infrastructure(format!("cannot write {}: {e}", self.path.display()))
        })?;
        debug!(path = %self.path.display(), bytes = bytes.len(), "configuration saved");
        Ok(())
    }
}

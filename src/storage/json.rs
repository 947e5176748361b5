//! JSON file record store
//!
//! The file holds one object keyed by the string form of each id:
//!
//! ```json
//! {
//!   "1": {
//!     "id": 1,
//!     "name": "Bulbasaur",
//!     "url": "https://...",
//!     "base": { "hp": 45, "attack": 49, ... }
//!   }
//! }
//! ```

use crate::model::RecordMap;
use crate::storage::{RecordStore, StorageError};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Record store backed by a single pretty-printed JSON file
#[derive(Debug, Clone)]
pub struct JsonRecordStore {
    path: PathBuf,
}

impl JsonRecordStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads and decodes the file without any recovery
    ///
    /// Returns `Ok(None)` when the file does not exist.
    pub fn try_load(&self) -> Result<Option<RecordMap>, StorageError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) if e.kind() == io::ErrorKind::InvalidData => {
                return Err(self.corrupt(format!("not valid UTF-8: {}", e)));
            }
            Err(e) => return Err(StorageError::io(&self.path, e)),
        };

        let records: RecordMap =
            serde_json::from_str(&content).map_err(|e| self.corrupt(e.to_string()))?;

        if let Some((key, record)) = records.iter().find(|(key, record)| **key != record.id) {
            return Err(self.corrupt(format!(
                "record stored under key {} has id {}",
                key, record.id
            )));
        }

        Ok(Some(records))
    }

    fn corrupt(&self, reason: String) -> StorageError {
        StorageError::Corrupt {
            path: self.path.clone(),
            reason,
        }
    }
}

impl RecordStore for JsonRecordStore {
    fn load(&self) -> Result<RecordMap, StorageError> {
        match self.try_load() {
            Ok(Some(records)) => {
                tracing::debug!(
                    "Loaded {} records from {}",
                    records.len(),
                    self.path.display()
                );
                Ok(records)
            }
            Ok(None) => {
                tracing::debug!("No record file at {}, starting empty", self.path.display());
                Ok(RecordMap::new())
            }
            Err(e @ StorageError::Corrupt { .. }) => {
                tracing::warn!("{}. Will be overwritten.", e);
                Ok(RecordMap::new())
            }
            Err(e) => Err(e),
        }
    }

    fn save(&self, records: &RecordMap) -> Result<(), StorageError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir).map_err(|e| StorageError::io(&dir, e))?;

        let mut content = serde_json::to_string_pretty(records)?;
        content.push('\n');

        // Write next to the target and rename over it, so readers never see a
        // half-written file.
        let mut tmp = NamedTempFile::new_in(&dir).map_err(|e| StorageError::io(&dir, e))?;
        if let Err(e) = write_synced(&mut tmp, content.as_bytes()) {
            return Err(StorageError::io(tmp.path(), e));
        }
        tmp.persist(&self.path).map_err(|e| StorageError::Persist {
            path: self.path.clone(),
            source: e,
        })?;

        tracing::debug!("Saved {} records to {}", records.len(), self.path.display());
        Ok(())
    }
}

fn write_synced(tmp: &mut NamedTempFile, content: &[u8]) -> io::Result<()> {
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.as_file().sync_all()
}

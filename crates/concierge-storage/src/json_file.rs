//! JSON file record store.
//!
//! The file holds a single object with a `profiles` array:
//!
//! ```json
//! {"profiles":[{"id":"user_123","name":"Alice","loyaltyPoints":1500,"tier":"Gold","lastVisit":"2024-07-09"}]}
//! ```
//!
//! A missing file, or one with no profiles, is written with the default
//! seed when the store is opened. After that the store is read-only.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use concierge_domain::Record;

use crate::error::{StorageError, StorageResult};
use crate::memory::MemoryRecordStore;
use crate::seed::default_records;
use crate::traits::RecordStore;

#[derive(Debug, Default, Serialize, Deserialize)]
struct ProfileFile {
    #[serde(default)]
    profiles: Vec<Record>,
}

/// Record store loaded from a JSON file.
#[derive(Debug)]
pub struct JsonFileRecordStore {
    path: PathBuf,
    records: MemoryRecordStore,
}

impl JsonFileRecordStore {
    /// Opens the file at `path`, seeding it first if it is missing or empty.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub async fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let path = path.as_ref().to_path_buf();

        let mut file = match tokio::fs::read_to_string(&path).await {
            Ok(contents) if contents.trim().is_empty() => ProfileFile::default(),
            Ok(contents) => serde_json::from_str::<ProfileFile>(&contents).map_err(|e| {
                StorageError::Serialization {
                    message: format!("{}: {e}", path.display()),
                }
            })?,
            Err(e) if e.kind() == ErrorKind::NotFound => ProfileFile::default(),
            Err(e) => return Err(io_error(&path, e)),
        };

        if file.profiles.is_empty() {
            file.profiles = default_records();
            let encoded = serde_json::to_string_pretty(&file).map_err(|e| {
                StorageError::Serialization {
                    message: e.to_string(),
                }
            })?;
            tokio::fs::write(&path, encoded)
                .await
                .map_err(|e| io_error(&path, e))?;
            info!(count = file.profiles.len(), "Seeded empty profile file");
        }

        Ok(Self {
            path,
            records: MemoryRecordStore::with_records(file.profiles),
        })
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of loaded profiles.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn io_error(path: &Path, err: std::io::Error) -> StorageError {
    StorageError::Io {
        path: path.display().to_string(),
        message: err.to_string(),
    }
}

#[async_trait]
impl RecordStore for JsonFileRecordStore {
    async fn list_all(&self) -> StorageResult<Vec<Record>> {
        self.records.list_all().await
    }

    async fn get(&self, id: &str) -> StorageResult<Option<Record>> {
        self.records.get(id).await
    }

    fn backend_name(&self) -> &'static str {
        "json"
    }
}

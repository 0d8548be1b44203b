use std::io;
use std::path::PathBuf;

use async_trait::async_trait;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// A stored record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    pub title: String,
    pub body: String,
}

impl Record {
    /// Create a record
    pub fn new(id: impl Into<String>, title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            body: body.into(),
        }
    }
}

/// Source of records, opaque to the handlers
#[async_trait]
pub trait RecordStore: Send + Sync + 'static {
    /// Load the record stored under `id`
    async fn fetch(&self, id: &str) -> Result<Record, StoreError>;
}

/// In-memory store
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: DashMap<String, Record>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a record
    pub fn insert(&self, record: Record) {
        self.records.insert(record.id.clone(), record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl FromIterator<Record> for MemoryStore {
    fn from_iter<I: IntoIterator<Item = Record>>(iter: I) -> Self {
        let store = Self::new();
        for record in iter {
            store.insert(record);
        }
        store
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn fetch(&self, id: &str) -> Result<Record, StoreError> {
        self.records
            .get(id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| StoreError::NotFound { id: id.to_owned() })
    }
}

/// Store reading one `<id>.json` file per record from a directory
#[derive(Debug, Clone)]
pub struct FileStore {
    directory: PathBuf,
}

impl FileStore {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    fn path_for(&self, id: &str) -> Option<PathBuf> {
        let valid = !id.is_empty()
            && id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');

        valid.then(|| self.directory.join(format!("{id}.json")))
    }
}

#[async_trait]
impl RecordStore for FileStore {
    async fn fetch(&self, id: &str) -> Result<Record, StoreError> {
        // Ids that cannot name a file in the directory never exist
        let Some(path) = self.path_for(id) else {
            return Err(StoreError::NotFound { id: id.to_owned() });
        };

        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound { id: id.to_owned() });
            }
            Err(source) => {
                return Err(StoreError::Io {
                    id: id.to_owned(),
                    source,
                });
            }
        };

        tracing::debug!(id, path = %path.display(), "record read from disk");

        serde_json::from_slice(&bytes).map_err(|source| StoreError::Corrupt {
            id: id.to_owned(),
            source,
        })
    }
}

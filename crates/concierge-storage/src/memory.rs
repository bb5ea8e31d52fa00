//! In-memory record store.

use async_trait::async_trait;
use dashmap::DashMap;
use tracing::instrument;

use concierge_domain::Record;

use crate::error::StorageResult;
use crate::seed::default_records;
use crate::traits::RecordStore;

/// In-memory implementation of RecordStore.
///
/// Uses DashMap so concurrent lookups never contend on a single lock.
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    records: DashMap<String, Record>,
}

impl MemoryRecordStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding the given records. Later duplicates win.
    pub fn with_records(records: impl IntoIterator<Item = Record>) -> Self {
        let store = Self::new();
        for record in records {
            store.records.insert(record.id.clone(), record);
        }
        store
    }

    /// Creates a store holding the default demo profiles.
    pub fn seeded() -> Self {
        Self::with_records(default_records())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    #[instrument(skip(self))]
    async fn list_all(&self) -> StorageResult<Vec<Record>> {
        let mut records: Vec<Record> = self.records.iter().map(|r| r.value().clone()).collect();
        records.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(records)
    }

    #[instrument(skip(self))]
    async fn get(&self, id: &str) -> StorageResult<Option<Record>> {
        Ok(self.records.get(id).map(|r| r.value().clone()))
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

//! RecordStore trait definition.

use async_trait::async_trait;

use concierge_domain::Record;

use crate::error::StorageResult;

/// Read-only access to profile records.
///
/// Implementations must be thread-safe (Send + Sync). The gateway never
/// writes through this trait; seeding happens when a store is opened.
#[async_trait]
pub trait RecordStore: Send + Sync + 'static {
    /// Lists every record, ordered by id.
    async fn list_all(&self) -> StorageResult<Vec<Record>>;

    /// Gets a record by id, or `None` when it does not exist.
    async fn get(&self, id: &str) -> StorageResult<Option<Record>>;

    /// Short backend name used in logs.
    fn backend_name(&self) -> &'static str;
}

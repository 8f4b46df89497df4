use crate::models::chunk::ChunkRecord;
use crate::models::error::StoreError;

/// Durable key-value store for persisted chunks.
///
/// The store is shared between the capture pipeline (writer) and the export
/// orchestrator (reader). Only one recording session uses it at a time.
pub trait ChunkStore: Send + Sync {
    /// Persist `record` under `key`, replacing any existing value.
    fn put(&self, key: &str, record: ChunkRecord) -> Result<(), StoreError>;

    /// Every stored record. Order is unspecified.
    fn iterate_all(&self) -> Result<Vec<ChunkRecord>, StoreError>;

    /// Remove every stored record.
    fn clear(&self) -> Result<(), StoreError>;
}

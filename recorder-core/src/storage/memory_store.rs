use std::collections::HashMap;

use parking_lot::Mutex;

use crate::models::chunk::ChunkRecord;
use crate::models::error::StoreError;
use crate::traits::chunk_store::ChunkStore;

/// In-process chunk store that keeps records in insertion order.
///
/// Re-putting an existing key replaces the record in place.
#[derive(Debug, Default)]
pub struct MemoryChunkStore {
    inner: Mutex<Entries>,
}

#[derive(Debug, Default)]
struct Entries {
    ordered: Vec<(String, ChunkRecord)>,
    /// Key to position in `ordered`.
    positions: HashMap<String, usize>,
}

impl MemoryChunkStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().ordered.is_empty()
    }

    /// Stored keys in insertion order.
    pub fn keys(&self) -> Vec<String> {
        self.inner.lock().ordered.iter().map(|(k, _)| k.clone()).collect()
    }
}

impl ChunkStore for MemoryChunkStore {
    fn put(&self, key: &str, record: ChunkRecord) -> Result<(), StoreError> {
        let mut entries = self.inner.lock();
        let Entries { ordered, positions } = &mut *entries;
        match positions.get(key) {
            Some(&position) => ordered[position].1 = record,
            None => {
                positions.insert(key.to_string(), ordered.len());
                ordered.push((key.to_string(), record));
            }
        }
        Ok(())
    }

    fn iterate_all(&self) -> Result<Vec<ChunkRecord>, StoreError> {
        Ok(self.inner.lock().ordered.iter().map(|(_, r)| r.clone()).collect())
    }

    fn clear(&self) -> Result<(), StoreError> {
        let mut entries = self.inner.lock();
        entries.ordered.clear();
        entries.positions.clear();
        Ok(())
    }
}

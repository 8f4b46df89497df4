/// One discrete media fragment as delivered by a capture source.
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    pub payload: Vec<u8>,
    /// Source timecode in milliseconds, if the source supplies one.
    pub timecode: Option<f64>,
}

impl Fragment {
    pub fn new(payload: Vec<u8>, timecode: Option<f64>) -> Self {
        Self { payload, timecode }
    }

    /// A zero-length fragment, used by sources as a heartbeat or final flush.
    pub fn heartbeat() -> Self {
        Self {
            payload: Vec::new(),
            timecode: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }

    pub fn len(&self) -> usize {
        self.payload.len()
    }
}

/// A persisted fragment.
///
/// `sequence_index` is assigned by the pipeline in ingestion order and forms
/// a gap-free run starting at 0 within a session.
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkRecord {
    pub sequence_index: u64,
    pub payload: Vec<u8>,
    pub capture_timestamp: f64,
}

impl ChunkRecord {
    /// Store key for a record, e.g. `chunk_12`.
    pub fn key(&self) -> String {
        chunk_key(self.sequence_index)
    }
}

pub fn chunk_key(sequence_index: u64) -> String {
    format!("chunk_{}", sequence_index)
}

/// Result of handing one fragment to the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum FragmentOutcome {
    /// Persisted under the given sequence index.
    Persisted { sequence_index: u64, bytes: usize },
    /// Timestamp fell behind the watermark.
    Dropped { timestamp: f64, watermark: f64 },
    /// Zero-length fragment while the recorder is still active.
    Heartbeat,
    /// Zero-length fragment that closed the session: the flush after stop, or
    /// a heartbeat from a source that reported itself inactive.
    Finalized,
    /// The pipeline was idle or the fragment belongs to an earlier session.
    Ignored,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_key_uses_sequence_index() {
        let record = ChunkRecord {
            sequence_index: 7,
            payload: vec![1, 2, 3],
            capture_timestamp: 10.0,
        };
        assert_eq!(record.key(), "chunk_7");
    }

    #[test]
    fn heartbeat_is_empty() {
        assert!(Fragment::heartbeat().is_empty());
        assert!(!Fragment::new(vec![0], Some(1.0)).is_empty());
    }
}

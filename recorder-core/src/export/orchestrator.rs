use std::sync::Arc;

use sha2::{Digest, Sha256};

use crate::export::cancellation::CancellationToken;
use crate::export::encoding;
use crate::models::error::{RecorderError, TranscodeError};
use crate::models::recording_result::{suggested_file_name, ExportArtifact, ExportMetadata};
use crate::traits::chunk_store::ChunkStore;
use crate::traits::transcoder::Transcoder;

/// Turns the persisted chunks of the last session into one downloadable file.
///
/// ```text
/// [ChunkStore] → sort by sequence_index → concat → [Transcoder] → ExportArtifact
/// ```
///
/// Read-only over the store. Runs on a caller thread, never the audio thread,
/// and may block for as long as the transcoder takes.
pub struct ExportOrchestrator {
    store: Arc<dyn ChunkStore>,
    transcoder: Arc<dyn Transcoder>,
    argv: Vec<String>,
}

impl ExportOrchestrator {
    pub fn new(store: Arc<dyn ChunkStore>, transcoder: Arc<dyn Transcoder>) -> Self {
        Self {
            store,
            transcoder,
            argv: encoding::transcode_argv(),
        }
    }

    /// Concatenate every stored payload in `sequence_index` order.
    ///
    /// The store's iteration order is not trusted. Returns the bytes and the
    /// number of chunks, or `EmptySession` if nothing was persisted.
    pub fn collect_input(&self) -> Result<(Vec<u8>, usize), RecorderError> {
        let mut records = self
            .store
            .iterate_all()
            .map_err(|e| RecorderError::StorageError(e.to_string()))?;
        if records.is_empty() {
            return Err(RecorderError::EmptySession);
        }

        records.sort_by_key(|r| r.sequence_index);

        let total: usize = records.iter().map(|r| r.payload.len()).sum();
        let mut input = Vec::with_capacity(total);
        for record in &records {
            input.extend_from_slice(&record.payload);
        }
        Ok((input, records.len()))
    }

    /// Export the stored session.
    ///
    /// Transcoder failures surface as `ExportFailed` without retry.
    /// Cancelling `cancel` at any point yields `Cancelled`; the store is
    /// never modified either way.
    pub fn export_session(
        &self,
        title: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<ExportArtifact, RecorderError> {
        if cancel.is_cancelled() {
            return Err(RecorderError::Cancelled);
        }

        let (input, chunk_count) = self.collect_input()?;
        log::info!("Exporting {} chunks ({} bytes)", chunk_count, input.len());

        if cancel.is_cancelled() {
            return Err(RecorderError::Cancelled);
        }

        let output = match self.transcoder.transcode(&input, &self.argv, cancel) {
            Ok(output) => output,
            Err(TranscodeError::Cancelled) => return Err(RecorderError::Cancelled),
            Err(e) => {
                log::error!("Transcode failed: {}", e);
                return Err(RecorderError::ExportFailed(e));
            }
        };

        if cancel.is_cancelled() {
            return Err(RecorderError::Cancelled);
        }

        let checksum = hex_encode(&Sha256::digest(&output));
        let metadata = ExportMetadata::new(chunk_count, input.len() as u64, output.len() as u64, &checksum);
        log::info!("Export complete: {} bytes, sha256 {}", output.len(), checksum);

        Ok(ExportArtifact {
            data: output,
            file_name: suggested_file_name(title),
            metadata,
        })
    }
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::chunk::ChunkRecord;
    use crate::storage::memory_store::MemoryChunkStore;
    use parking_lot::Mutex;

    /// Records what it was asked to transcode and returns a fixed result.
    struct RecordingTranscoder {
        calls: Mutex<Vec<(Vec<u8>, Vec<String>)>>,
        result: Result<Vec<u8>, TranscodeError>,
        cancel_during: bool,
    }

    impl RecordingTranscoder {
        fn ok(output: &[u8]) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                result: Ok(output.to_vec()),
                cancel_during: false,
            }
        }

        fn failing(error: TranscodeError) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                result: Err(error),
                cancel_during: false,
            }
        }

        fn call_count(&self) -> usize {
            self.calls.lock().len()
        }
    }

    impl Transcoder for RecordingTranscoder {
        fn transcode(
            &self,
            input: &[u8],
            argv: &[String],
            cancel: &CancellationToken,
        ) -> Result<Vec<u8>, TranscodeError> {
            self.calls.lock().push((input.to_vec(), argv.to_vec()));
            if self.cancel_during {
                cancel.cancel();
            }
            self.result.clone()
        }
    }

    fn record(index: u64, payload: &[u8]) -> ChunkRecord {
        ChunkRecord {
            sequence_index: index,
            payload: payload.to_vec(),
            capture_timestamp: index as f64 * 500.0,
        }
    }

    fn store_with(records: &[ChunkRecord]) -> Arc<MemoryChunkStore> {
        let store = Arc::new(MemoryChunkStore::new());
        for r in records {
            store.put(&r.key(), r.clone()).unwrap();
        }
        store
    }

    #[test]
    fn concatenates_in_sequence_order() {
        let store = store_with(&[record(2, b"cc"), record(0, b"aa"), record(1, b"bb")]);
        let transcoder = Arc::new(RecordingTranscoder::ok(b"mp4"));
        let orchestrator = ExportOrchestrator::new(store, transcoder.clone());

        let artifact = orchestrator.export_session(None, &CancellationToken::new()).unwrap();

        let calls = transcoder.calls.lock();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, b"aabbcc".to_vec());
        assert_eq!(calls[0].1, encoding::transcode_argv());
        assert_eq!(artifact.data, b"mp4".to_vec());
        assert_eq!(artifact.file_name, "recording.mp4");
        assert_eq!(artifact.metadata.chunk_count, 3);
        assert_eq!(artifact.metadata.input_bytes, 6);
        assert_eq!(artifact.metadata.output_bytes, 3);
    }

    #[test]
    fn empty_store_fails_before_transcoding() {
        let transcoder = Arc::new(RecordingTranscoder::ok(b"mp4"));
        let orchestrator = ExportOrchestrator::new(Arc::new(MemoryChunkStore::new()), transcoder.clone());

        let err = orchestrator.export_session(None, &CancellationToken::new()).unwrap_err();

        assert_eq!(err, RecorderError::EmptySession);
        assert_eq!(transcoder.call_count(), 0);
    }

    #[test]
    fn transcoder_failure_surfaces_verbatim() {
        let failure = TranscodeError::Failed {
            status: 1,
            stderr: "moov atom not found".into(),
        };
        let transcoder = Arc::new(RecordingTranscoder::failing(failure.clone()));
        let orchestrator = ExportOrchestrator::new(store_with(&[record(0, b"x")]), transcoder.clone());

        let err = orchestrator.export_session(None, &CancellationToken::new()).unwrap_err();

        assert_eq!(err, RecorderError::ExportFailed(failure));
        assert_eq!(transcoder.call_count(), 1);
    }

    #[test]
    fn cancelled_before_start_skips_transcoder() {
        let store = store_with(&[record(0, b"x")]);
        let transcoder = Arc::new(RecordingTranscoder::ok(b"mp4"));
        let orchestrator = ExportOrchestrator::new(store.clone(), transcoder.clone());
        let cancel = CancellationToken::new();
        cancel.cancel();

        assert_eq!(orchestrator.export_session(None, &cancel).unwrap_err(), RecorderError::Cancelled);
        assert_eq!(transcoder.call_count(), 0);
        assert_eq!(store.iterate_all().unwrap().len(), 1);
    }

    #[test]
    fn cancelled_during_transcode_discards_output() {
        let store = store_with(&[record(0, b"x"), record(1, b"y")]);
        let transcoder = Arc::new(RecordingTranscoder {
            cancel_during: true,
            ..RecordingTranscoder::ok(b"mp4")
        });
        let orchestrator = ExportOrchestrator::new(store.clone(), transcoder);

        let err = orchestrator.export_session(None, &CancellationToken::new()).unwrap_err();

        assert_eq!(err, RecorderError::Cancelled);
        assert_eq!(store.iterate_all().unwrap().len(), 2);
    }

    #[test]
    fn transcoder_cancel_maps_to_cancelled() {
        let transcoder = Arc::new(RecordingTranscoder::failing(TranscodeError::Cancelled));
        let orchestrator = ExportOrchestrator::new(store_with(&[record(0, b"x")]), transcoder);

        let err = orchestrator.export_session(None, &CancellationToken::new()).unwrap_err();
        assert_eq!(err, RecorderError::Cancelled);
    }

    #[test]
    fn checksum_and_title() {
        let transcoder = Arc::new(RecordingTranscoder::ok(b"abc"));
        let orchestrator = ExportOrchestrator::new(store_with(&[record(0, b"x")]), transcoder);

        let artifact = orchestrator
            .export_session(Some("standup: 10/16"), &CancellationToken::new())
            .unwrap();

        assert_eq!(artifact.file_name, "standup_ 10_16.mp4");
        assert_eq!(
            artifact.metadata.checksum,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}

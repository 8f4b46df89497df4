//! # recorder-core
//!
//! Platform-agnostic core of a screen + audio recorder.
//!
//! Provides the adaptive echo filter, audio graph assembly, the chunked
//! capture pipeline and export orchestration. Hosts supply storage, quota,
//! capture and transcoding backends by implementing the traits in `traits/`.
//!
//! ## Architecture
//!
//! ```text
//! recorder-core (this crate)
//! ├── traits/       ← CaptureSource, ChunkStore, QuotaOracle, Transcoder, RecorderDelegate, Clock
//! ├── models/       ← RecorderError, RecorderState, RecorderConfiguration, AudioTopology, chunks
//! ├── processing/   ← LmsFilter, AudioGraphAssembler, level metering
//! ├── session/      ← ChunkPipeline, RecordingSession, GraceTimer
//! ├── export/       ← ExportOrchestrator, encoder options, cancellation
//! └── storage/      ← MemoryChunkStore, settings file, export metadata
//! ```

pub mod export;
pub mod models;
pub mod processing;
pub mod session;
pub mod storage;
pub mod traits;

// Re-export key types at crate root for convenience.
pub use export::cancellation::CancellationToken;
pub use export::encoding::EncoderOptions;
pub use export::orchestrator::ExportOrchestrator;
pub use models::audio_models::{AudioLevels, AudioSource, AudioTopology, AudioTrackType};
pub use models::chunk::{ChunkRecord, Fragment, FragmentOutcome};
pub use models::config::{FilterOptions, RecorderConfiguration};
pub use models::error::{RecorderError, StoreError, TranscodeError};
pub use models::recording_result::{ExportArtifact, ExportMetadata, SessionSummary};
pub use models::settings::{Quality, RecordingSettings};
pub use models::state::{CompletionReason, RecorderState};
pub use processing::adaptive_filter::LmsFilter;
pub use processing::audio_graph::{AudioGraph, AudioGraphAssembler};
pub use session::pipeline::{ChunkPipeline, FragmentSink};
pub use storage::memory_store::MemoryChunkStore;
pub use traits::capability::{FormatSupport, ProcessingEnvironment};
pub use traits::capture_source::CaptureSource;
pub use traits::chunk_store::ChunkStore;
pub use traits::clock::{Clock, SystemClock};
pub use traits::quota_oracle::{QuotaOracle, StorageEstimate};
pub use traits::recorder_delegate::RecorderDelegate;
pub use traits::transcoder::Transcoder;

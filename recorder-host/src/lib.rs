//! # recorder-host
//!
//! Desktop host backend for recorder-core.
//!
//! Provides:
//! - `DirectoryChunkStore` — chunk records as files under one directory
//! - `DirectoryQuotaOracle` — fixed byte budget minus directory usage
//! - `FfmpegTranscoder` — export transcoding via an external `ffmpeg` process
//! - `NativeEnvironment` — in-process audio rendering capabilities
//!
//! ## Usage
//! ```ignore
//! use std::sync::Arc;
//! use recorder_core::{ChunkPipeline, ExportOrchestrator, RecorderConfiguration};
//! use recorder_host::{DirectoryChunkStore, DirectoryQuotaOracle, FfmpegTranscoder};
//!
//! let store = Arc::new(DirectoryChunkStore::open("/var/tmp/recorder/chunks")?);
//! let quota = Arc::new(DirectoryQuotaOracle::new("/var/tmp/recorder", 2 << 30));
//! let pipeline = ChunkPipeline::new(store.clone(), quota, &RecorderConfiguration::default());
//! let export = ExportOrchestrator::new(store, Arc::new(FfmpegTranscoder::new("ffmpeg")));
//! ```

pub mod dir_quota;
pub mod dir_store;
pub mod ffmpeg;

pub use dir_quota::DirectoryQuotaOracle;
pub use dir_store::DirectoryChunkStore;
pub use ffmpeg::FfmpegTranscoder;

use recorder_core::traits::capability::ProcessingEnvironment;

/// Processing environment for native hosts: audio is rendered in-process,
/// so custom per-sample processing is always available.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeEnvironment;

impl ProcessingEnvironment for NativeEnvironment {
    fn supports_custom_processing(&self) -> bool {
        true
    }
}

use thiserror::Error;

/// Errors surfaced by the recorder core.
///
/// Dropped out-of-order fragments are not errors; they are reported through
/// `FragmentOutcome::Dropped` instead.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RecorderError {
    #[error("storage quota exceeded: {available_bytes} bytes available, {floor_bytes} required")]
    QuotaExceeded { available_bytes: u64, floor_bytes: u64 },

    #[error("persistence failure: {0}")]
    PersistenceFailure(#[from] StoreError),

    #[error("no recorded chunks to export")]
    EmptySession,

    #[error("export failed: {0}")]
    ExportFailed(#[from] TranscodeError),

    #[error("capability unavailable: {0}")]
    CapabilityUnavailable(String),

    #[error("operation cancelled")]
    Cancelled,

    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error("configuration failed: {0}")]
    ConfigurationFailed(String),

    #[error("storage error: {0}")]
    StorageError(String),
}

/// Failure reported by a durable chunk store.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("write failed for key {key}: {reason}")]
    Write { key: String, reason: String },

    #[error("read failed: {0}")]
    Read(String),

    #[error("clear failed: {0}")]
    Clear(String),

    #[error("corrupt record {key}: {reason}")]
    Corrupt { key: String, reason: String },
}

/// Failure reported by the external transcoder.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TranscodeError {
    #[error("transcoder unavailable: {0}")]
    Unavailable(String),

    #[error("transcoder exited with status {status}: {stderr}")]
    Failed { status: i32, stderr: String },

    #[error("transcoder io error: {0}")]
    Io(String),

    #[error("transcode cancelled")]
    Cancelled,
}

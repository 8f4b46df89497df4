use crate::export::cancellation::CancellationToken;
use crate::models::error::TranscodeError;

/// External container/codec transcoder.
///
/// Equivalent to running an ffmpeg-style tool over an in-memory file:
/// `input` is the concatenated fragment container and `argv` the fixed
/// argument list chosen by the export orchestrator.
pub trait Transcoder: Send + Sync {
    /// Transcode `input`. Implementations should poll `cancel` and return
    /// `TranscodeError::Cancelled` promptly once it is set.
    fn transcode(
        &self,
        input: &[u8],
        argv: &[String],
        cancel: &CancellationToken,
    ) -> Result<Vec<u8>, TranscodeError>;
}

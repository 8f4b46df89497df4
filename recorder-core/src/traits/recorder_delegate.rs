use crate::models::error::RecorderError;
use crate::models::recording_result::SessionSummary;
use crate::models::state::RecorderState;

/// Event delegate for recorder notifications.
///
/// Called from whichever thread delivered the triggering fragment or fired
/// the grace timer, never while the pipeline lock is held.
pub trait RecorderDelegate: Send + Sync {
    /// Called when the pipeline state changes.
    fn on_state_changed(&self, state: RecorderState);

    /// Called after a chunk is persisted.
    fn on_chunk_persisted(&self, sequence_index: u64, bytes: usize);

    /// Called when a session is aborted by an error.
    fn on_error(&self, error: &RecorderError);

    /// Called when a session returns to idle.
    fn on_session_finished(&self, summary: &SessionSummary);
}

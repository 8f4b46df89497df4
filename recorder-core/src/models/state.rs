use super::error::RecorderError;

/// Chunk pipeline state machine.
///
/// State transitions:
/// ```text
/// idle → capturing → finishing → idle
///           │                      ↑
///           └── abort (quota / store failure / inactive heartbeat)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecorderState {
    Idle,
    Capturing,
    Finishing,
}

impl RecorderState {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn is_capturing(&self) -> bool {
        matches!(self, Self::Capturing)
    }

    pub fn is_finishing(&self) -> bool {
        matches!(self, Self::Finishing)
    }

    /// Whether fragment arrivals are processed in this state.
    pub fn accepts_fragments(&self) -> bool {
        matches!(self, Self::Capturing | Self::Finishing)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Capturing => "capturing",
            Self::Finishing => "finishing",
        }
    }
}

/// Why a session returned to `Idle`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionReason {
    /// The capture source delivered its flush fragment after stop.
    Flushed,
    /// The grace period elapsed without a flush fragment.
    GracePeriodElapsed,
    /// A zero-length fragment arrived while the recorder reported inactive.
    SourceInactive,
    /// A new session was started while this one was still finishing.
    Superseded,
    /// The session was aborted by an error.
    Aborted(RecorderError),
}

impl CompletionReason {
    pub fn is_abort(&self) -> bool {
        matches!(self, Self::Aborted(_))
    }
}

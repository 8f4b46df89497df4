use crate::models::error::RecorderError;
use crate::session::pipeline::FragmentSink;

/// Interface for an external media capture source.
///
/// The source produces timestamped fragments on its own schedule and hands
/// them to the `FragmentSink` it was started with. Arrival order through the
/// sink is the only ordering the pipeline trusts.
pub trait CaptureSource: Send + Sync {
    /// Begin producing fragments into `sink`.
    fn start(&self, sink: FragmentSink) -> Result<(), RecorderError>;

    /// Ask the source to end the stream.
    ///
    /// Sources typically emit one final fragment after stop, but some
    /// platforms never do. May deliver that fragment synchronously.
    fn stop(&self);

    /// Whether the underlying recorder has reported itself inactive.
    fn is_inactive(&self) -> bool;
}

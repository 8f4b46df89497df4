pub mod cancellation;
pub mod encoding;
pub mod orchestrator;

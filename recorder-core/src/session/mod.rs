pub mod grace_timer;
pub mod pipeline;
pub mod recording_session;

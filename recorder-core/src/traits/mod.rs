pub mod capability;
pub mod capture_source;
pub mod chunk_store;
pub mod clock;
pub mod quota_oracle;
pub mod recorder_delegate;
pub mod transcoder;

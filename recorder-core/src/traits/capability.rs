/// Execution environment of the audio graph.
pub trait ProcessingEnvironment: Send + Sync {
    /// Whether per-sample custom processing nodes can run.
    fn supports_custom_processing(&self) -> bool;
}

/// Capability query for recorder output formats.
pub trait FormatSupport {
    fn is_type_supported(&self, mime_type: &str) -> bool;
}

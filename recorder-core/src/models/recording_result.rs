use serde::{Deserialize, Serialize};

use super::state::CompletionReason;

/// Mime type of the transcoded artifact.
pub const EXPORT_MIME_TYPE: &str = "video/mp4";

/// Summary delivered when a session returns to idle.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSummary {
    pub session_id: String,
    pub chunks_persisted: u64,
    pub bytes_persisted: u64,
    pub chunks_dropped: u64,
    pub reason: CompletionReason,
}

/// Final downloadable artifact produced by an export.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportArtifact {
    pub data: Vec<u8>,
    pub file_name: String,
    pub metadata: ExportMetadata,
}

impl ExportArtifact {
    /// Write the artifact and its metadata sidecar into `directory`.
    pub fn save_to(&self, directory: &std::path::Path) -> Result<std::path::PathBuf, super::error::RecorderError> {
        crate::storage::metadata::write_artifact(self, directory)
    }
}

/// Metadata stored alongside an exported recording.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportMetadata {
    pub id: String,
    pub created_at: String,
    pub mime_type: String,
    pub checksum: String,
    pub chunk_count: usize,
    pub input_bytes: u64,
    pub output_bytes: u64,
}

impl ExportMetadata {
    pub fn new(chunk_count: usize, input_bytes: u64, output_bytes: u64, checksum: &str) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
            mime_type: EXPORT_MIME_TYPE.to_string(),
            checksum: checksum.to_string(),
            chunk_count,
            input_bytes,
            output_bytes,
        }
    }
}

/// Characters that are replaced in user-supplied titles.
const UNSAFE_TITLE_CHARS: &[char] = &['/', '\\', ':', '?', '~', '<', '>', '|', '*', '"'];

/// Derive a download file name from an optional title.
///
/// Path and shell-hostile characters become `_`; no title yields `recording.mp4`.
pub fn suggested_file_name(title: Option<&str>) -> String {
    let stem = match title {
        Some(t) if !t.is_empty() => t.replace(UNSAFE_TITLE_CHARS, "_"),
        _ => "recording".to_string(),
    };
    format!("{}.mp4", stem)
}

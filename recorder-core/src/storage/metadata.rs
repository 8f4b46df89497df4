use std::fs;
use std::path::{Path, PathBuf};

use crate::models::error::RecorderError;
use crate::models::recording_result::{ExportArtifact, ExportMetadata};

/// Write an exported artifact into `directory` with a JSON metadata sidecar.
///
/// Creates `{directory}/{file_name}` and `{file_stem}.metadata.json` next to
/// it. Returns the artifact path.
pub fn write_artifact(artifact: &ExportArtifact, directory: &Path) -> Result<PathBuf, RecorderError> {
    fs::create_dir_all(directory)
        .map_err(|e| RecorderError::StorageError(format!("failed to create directory: {}", e)))?;

    let path = directory.join(&artifact.file_name);
    fs::write(&path, &artifact.data)
        .map_err(|e| RecorderError::StorageError(format!("failed to write artifact: {}", e)))?;
    write_metadata(&artifact.metadata, &path)?;
    Ok(path)
}

/// Write export metadata as a JSON sidecar file.
pub fn write_metadata(metadata: &ExportMetadata, artifact_path: &Path) -> Result<(), RecorderError> {
    let metadata_path = artifact_path.with_extension("metadata.json");
    let json = serde_json::to_string_pretty(metadata)
        .map_err(|e| RecorderError::StorageError(format!("failed to serialize metadata: {}", e)))?;
    fs::write(&metadata_path, json)
        .map_err(|e| RecorderError::StorageError(format!("failed to write metadata: {}", e)))?;
    Ok(())
}

/// Read export metadata from a JSON sidecar file.
pub fn read_metadata(artifact_path: &Path) -> Result<ExportMetadata, RecorderError> {
    let metadata_path = artifact_path.with_extension("metadata.json");
    let json = fs::read_to_string(&metadata_path)
        .map_err(|e| RecorderError::StorageError(format!("failed to read metadata: {}", e)))?;
    let metadata: ExportMetadata = serde_json::from_str(&json)
        .map_err(|e| RecorderError::StorageError(format!("failed to parse metadata: {}", e)))?;
    Ok(metadata)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("recorder_core_test_{}_{}", name, uuid::Uuid::new_v4()))
    }

    #[test]
    fn artifact_and_sidecar_round_trip() {
        let dir = temp_dir("artifact");
        let artifact = ExportArtifact {
            data: b"mp4-bytes".to_vec(),
            file_name: "demo.mp4".into(),
            metadata: ExportMetadata::new(2, 20, 9, "deadbeef"),
        };

        let path = artifact.save_to(&dir).unwrap();

        assert_eq!(path, dir.join("demo.mp4"));
        assert_eq!(fs::read(&path).unwrap(), b"mp4-bytes");
        assert!(dir.join("demo.metadata.json").exists());
        assert_eq!(read_metadata(&path).unwrap(), artifact.metadata);

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn missing_sidecar_is_a_storage_error() {
        let err = read_metadata(&temp_dir("missing").join("none.mp4")).unwrap_err();
        assert!(matches!(err, RecorderError::StorageError(_)));
    }
}

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use crate::models::error::RecorderError;
use crate::models::settings::RecordingSettings;

/// Load persisted recording settings.
///
/// A missing file yields the defaults; a malformed one is an error.
pub fn load_settings(path: &Path) -> Result<RecordingSettings, RecorderError> {
    let json = match fs::read_to_string(path) {
        Ok(json) => json,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(RecordingSettings::default()),
        Err(e) => return Err(RecorderError::StorageError(format!("failed to read settings: {}", e))),
    };
    let settings: RecordingSettings = serde_json::from_str(&json)
        .map_err(|e| RecorderError::StorageError(format!("failed to parse settings: {}", e)))?;
    settings.validate().map_err(RecorderError::ConfigurationFailed)?;
    Ok(settings)
}

/// Persist recording settings as JSON.
pub fn save_settings(settings: &RecordingSettings, path: &Path) -> Result<(), RecorderError> {
    settings.validate().map_err(RecorderError::ConfigurationFailed)?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| RecorderError::StorageError(format!("failed to create directory: {}", e)))?;
    }
    let json = serde_json::to_string_pretty(settings)
        .map_err(|e| RecorderError::StorageError(format!("failed to serialize settings: {}", e)))?;
    fs::write(path, json).map_err(|e| RecorderError::StorageError(format!("failed to write settings: {}", e)))?;
    Ok(())
}

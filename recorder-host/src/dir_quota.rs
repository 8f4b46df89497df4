use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use recorder_core::traits::quota_oracle::{QuotaOracle, StorageEstimate};

/// Quota oracle for a directory with a fixed byte budget.
///
/// Usage is the total size of regular files under `directory`, walked
/// recursively on every estimate.
pub struct DirectoryQuotaOracle {
    directory: PathBuf,
    quota_bytes: u64,
}

impl DirectoryQuotaOracle {
    pub fn new(directory: impl Into<PathBuf>, quota_bytes: u64) -> Self {
        Self {
            directory: directory.into(),
            quota_bytes,
        }
    }
}

impl QuotaOracle for DirectoryQuotaOracle {
    fn estimate(&self) -> Option<StorageEstimate> {
        match directory_size(&self.directory) {
            Ok(used_bytes) => Some(StorageEstimate {
                quota_bytes: self.quota_bytes,
                used_bytes,
            }),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Some(StorageEstimate {
                quota_bytes: self.quota_bytes,
                used_bytes: 0,
            }),
            Err(e) => {
                log::warn!("Storage estimate unavailable for {}: {}", self.directory.display(), e);
                None
            }
        }
    }
}

fn directory_size(path: &Path) -> io::Result<u64> {
    let mut total = 0u64;
    for entry in fs::read_dir(path)? {
        let entry = entry?;
        let file_type = entry.file_type()?;
        if file_type.is_dir() {
            total += directory_size(&entry.path())?;
        } else if file_type.is_file() {
            total += entry.metadata()?.len();
        }
    }
    Ok(total)
}

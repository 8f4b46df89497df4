//! Directory-backed chunk store.
//!
//! One file per key, named `<key>.chunk`:
//!
//! ```text
//! [4-byte magic "RCHK"]
//! [8-byte LE sequence index]
//! [8-byte LE capture timestamp (f64 bits)]
//! [8-byte LE payload length]
//! [payload...]
//! ```
//!
//! Writes go to a temporary file first and are renamed into place, so a
//! crash mid-write never leaves a truncated record under a valid key.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use thiserror::Error;

use recorder_core::models::chunk::ChunkRecord;
use recorder_core::models::error::StoreError;
use recorder_core::traits::chunk_store::ChunkStore;

const MAGIC: &[u8; 4] = b"RCHK";
const HEADER_SIZE: usize = 28;
const CHUNK_EXTENSION: &str = "chunk";
/// Extension of in-flight writes; leftovers are swept by `clear`.
const TEMP_EXTENSION: &str = "tmp";

#[derive(Debug, Error, PartialEq, Eq)]
enum DecodeError {
    #[error("file shorter than header ({0} bytes)")]
    Truncated(usize),
    #[error("bad magic")]
    BadMagic,
    #[error("payload length {declared} does not match {actual} bytes on disk")]
    LengthMismatch { declared: u64, actual: usize },
}

/// `ChunkStore` that persists each record as a file under one directory.
pub struct DirectoryChunkStore {
    directory: PathBuf,
    write_lock: Mutex<()>,
}

impl DirectoryChunkStore {
    /// Open (and create if needed) a store rooted at `directory`.
    pub fn open(directory: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let directory = directory.into();
        fs::create_dir_all(&directory)
            .map_err(|e| StoreError::Write {
                key: directory.display().to_string(),
                reason: format!("failed to create directory: {}", e),
            })?;
        log::info!("Chunk store opened at {}", directory.display());
        Ok(Self {
            directory,
            write_lock: Mutex::new(()),
        })
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.directory.join(format!("{}.{}", key, CHUNK_EXTENSION))
    }

    fn chunk_files(&self) -> io::Result<Vec<PathBuf>> {
        self.files_with_extension(CHUNK_EXTENSION)
    }

    fn files_with_extension(&self, extension: &str) -> io::Result<Vec<PathBuf>> {
        let entries = match fs::read_dir(&self.directory) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };

        let mut files = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == extension) {
                files.push(path);
            }
        }
        Ok(files)
    }
}

impl ChunkStore for DirectoryChunkStore {
    fn put(&self, key: &str, record: ChunkRecord) -> Result<(), StoreError> {
        let write_error = |e: io::Error| StoreError::Write {
            key: key.to_string(),
            reason: e.to_string(),
        };

        let _guard = self.write_lock.lock();
        let path = self.path_for(key);
        let tmp_path = path.with_extension(format!("{}.{}", CHUNK_EXTENSION, TEMP_EXTENSION));

        let written = write_record(&tmp_path, &record).and_then(|()| fs::rename(&tmp_path, &path));
        if let Err(e) = written {
            if let Err(cleanup) = fs::remove_file(&tmp_path) {
                if cleanup.kind() != io::ErrorKind::NotFound {
                    log::warn!("Failed to remove {}: {}", tmp_path.display(), cleanup);
                }
            }
            return Err(write_error(e));
        }
        Ok(())
    }

    fn iterate_all(&self) -> Result<Vec<ChunkRecord>, StoreError> {
        let files = self.chunk_files().map_err(|e| StoreError::Read(e.to_string()))?;

        let mut records = Vec::with_capacity(files.len());
        for path in files {
            let bytes = fs::read(&path).map_err(|e| StoreError::Read(format!("{}: {}", path.display(), e)))?;
            let record = decode(&bytes).map_err(|e| StoreError::Corrupt {
                key: key_of(&path),
                reason: e.to_string(),
            })?;
            records.push(record);
        }
        Ok(records)
    }

    fn clear(&self) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock();
        let mut files = self.chunk_files().map_err(|e| StoreError::Clear(e.to_string()))?;
        let count = files.len();
        files.extend(
            self.files_with_extension(TEMP_EXTENSION)
                .map_err(|e| StoreError::Clear(e.to_string()))?,
        );
        for path in files {
            match fs::remove_file(&path) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(StoreError::Clear(format!("{}: {}", path.display(), e))),
            }
        }
        log::debug!("Cleared {} chunk files from {}", count, self.directory.display());
        Ok(())
    }
}

fn write_record(path: &Path, record: &ChunkRecord) -> io::Result<()> {
    let mut file = fs::File::create(path)?;
    file.write_all(&encode_header(record))?;
    file.write_all(&record.payload)?;
    file.sync_data()
}

fn key_of(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn encode_header(record: &ChunkRecord) -> [u8; HEADER_SIZE] {
    let mut header = [0u8; HEADER_SIZE];
    header[0..4].copy_from_slice(MAGIC);
    header[4..12].copy_from_slice(&record.sequence_index.to_le_bytes());
    header[12..20].copy_from_slice(&record.capture_timestamp.to_bits().to_le_bytes());
    header[20..28].copy_from_slice(&(record.payload.len() as u64).to_le_bytes());
    header
}

fn decode(bytes: &[u8]) -> Result<ChunkRecord, DecodeError> {
    if bytes.len() < HEADER_SIZE {
        return Err(DecodeError::Truncated(bytes.len()));
    }
    if &bytes[0..4] != MAGIC {
        return Err(DecodeError::BadMagic);
    }

    let sequence_index = u64::from_le_bytes(read_array(&bytes[4..12]));
    let capture_timestamp = f64::from_bits(u64::from_le_bytes(read_array(&bytes[12..20])));
    let declared = u64::from_le_bytes(read_array(&bytes[20..28]));

    let payload = &bytes[HEADER_SIZE..];
    if declared != payload.len() as u64 {
        return Err(DecodeError::LengthMismatch {
            declared,
            actual: payload.len(),
        });
    }

    Ok(ChunkRecord {
        sequence_index,
        payload: payload.to_vec(),
        capture_timestamp,
    })
}

fn read_array(slice: &[u8]) -> [u8; 8] {
    let mut out = [0u8; 8];
    out.copy_from_slice(slice);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store(name: &str) -> DirectoryChunkStore {
        let dir = std::env::temp_dir().join(format!("recorder_host_test_{}_{}", name, uuid::Uuid::new_v4()));
        DirectoryChunkStore::open(dir).unwrap()
    }

    fn record(index: u64, payload: &[u8]) -> ChunkRecord {
        ChunkRecord {
            sequence_index: index,
            payload: payload.to_vec(),
            capture_timestamp: 1_000.5 + index as f64,
        }
    }

    #[test]
    fn put_and_iterate() {
        let store = temp_store("put");
        store.put("chunk_0", record(0, b"first")).unwrap();
        store.put("chunk_1", record(1, b"second")).unwrap();

        let mut records = store.iterate_all().unwrap();
        records.sort_by_key(|r| r.sequence_index);

        assert_eq!(records, vec![record(0, b"first"), record(1, b"second")]);
        assert!(store.directory().join("chunk_1.chunk").exists());

        fs::remove_dir_all(store.directory()).ok();
    }

    #[test]
    fn put_replaces_existing_key() {
        let store = temp_store("replace");
        store.put("chunk_0", record(0, b"old")).unwrap();
        store.put("chunk_0", record(0, b"new")).unwrap();

        let records = store.iterate_all().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].payload, b"new".to_vec());

        fs::remove_dir_all(store.directory()).ok();
    }

    #[test]
    fn clear_removes_only_chunk_files() {
        let store = temp_store("clear");
        store.put("chunk_0", record(0, b"a")).unwrap();
        fs::write(store.directory().join("notes.txt"), b"keep").unwrap();

        store.clear().unwrap();

        assert!(store.iterate_all().unwrap().is_empty());
        assert!(store.directory().join("notes.txt").exists());

        fs::remove_dir_all(store.directory()).ok();
    }

    #[test]
    fn failed_put_leaves_no_temp_file() {
        let store = temp_store("failed_put");
        // A directory squatting on the final name makes the rename fail.
        fs::create_dir(store.directory().join("chunk_0.chunk")).unwrap();

        let err = store.put("chunk_0", record(0, b"a")).unwrap_err();

        assert!(matches!(err, StoreError::Write { ref key, .. } if key == "chunk_0"));
        assert!(!store.directory().join("chunk_0.chunk.tmp").exists());

        fs::remove_dir_all(store.directory()).ok();
    }

    #[test]
    fn clear_sweeps_leftover_temp_files() {
        let store = temp_store("sweep");
        store.put("chunk_0", record(0, b"a")).unwrap();
        fs::write(store.directory().join("chunk_1.chunk.tmp"), b"partial").unwrap();

        // Leftovers are never read back as records.
        assert_eq!(store.iterate_all().unwrap().len(), 1);

        store.clear().unwrap();

        assert!(!store.directory().join("chunk_1.chunk.tmp").exists());
        assert!(store.iterate_all().unwrap().is_empty());

        fs::remove_dir_all(store.directory()).ok();
    }

    #[test]
    fn corrupt_file_is_reported() {
        let store = temp_store("corrupt");
        fs::write(store.directory().join("chunk_3.chunk"), b"RCHK short").unwrap();

        let err = store.iterate_all().unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { ref key, .. } if key == "chunk_3"));

        fs::remove_dir_all(store.directory()).ok();
    }

    #[test]
    fn decode_rejects_bad_magic_and_length() {
        let mut bytes = encode_header(&record(0, b"abc")).to_vec();
        bytes.extend_from_slice(b"abc");
        assert_eq!(decode(&bytes).unwrap(), record(0, b"abc"));

        let mut truncated = bytes.clone();
        truncated.pop();
        assert_eq!(
            decode(&truncated).unwrap_err(),
            DecodeError::LengthMismatch { declared: 3, actual: 2 }
        );

        bytes[0] = b'X';
        assert_eq!(decode(&bytes).unwrap_err(), DecodeError::BadMagic);
    }

    #[test]
    fn missing_directory_reads_as_empty() {
        let store = temp_store("gone");
        fs::remove_dir_all(store.directory()).unwrap();

        assert!(store.iterate_all().unwrap().is_empty());
        store.clear().unwrap();
    }
}

//! `ffmpeg` process transcoder.
//!
//! Each call gets its own scratch directory holding the input file, the
//! output file and the child's stderr log. The directory is removed when the
//! call returns, whatever the outcome.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;
use std::time::Duration;

use recorder_core::export::cancellation::CancellationToken;
use recorder_core::export::encoding::{TRANSCODE_INPUT_NAME, TRANSCODE_OUTPUT_NAME};
use recorder_core::models::error::TranscodeError;
use recorder_core::traits::transcoder::Transcoder;

const STDERR_LOG_NAME: &str = "stderr.log";
/// Only the tail of stderr is kept in errors; ffmpeg is verbose.
const STDERR_TAIL_BYTES: usize = 4096;
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Runs an external `ffmpeg` binary to turn the concatenated fragments into
/// an mp4.
pub struct FfmpegTranscoder {
    binary: PathBuf,
    scratch_root: PathBuf,
    poll_interval: Duration,
}

impl FfmpegTranscoder {
    /// Use `binary` (e.g. `"ffmpeg"` from `PATH`) with scratch space under
    /// the system temp directory.
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            scratch_root: std::env::temp_dir(),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_scratch_root(mut self, scratch_root: impl Into<PathBuf>) -> Self {
        self.scratch_root = scratch_root.into();
        self
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    fn run(
        &self,
        scratch: &Path,
        input: &[u8],
        argv: &[String],
        cancel: &CancellationToken,
    ) -> Result<Vec<u8>, TranscodeError> {
        fs::write(scratch.join(TRANSCODE_INPUT_NAME), input).map_err(io_error)?;
        let stderr_log = File::create(scratch.join(STDERR_LOG_NAME)).map_err(io_error)?;

        let mut child = Command::new(&self.binary)
            .args(argv)
            .current_dir(scratch)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::from(stderr_log))
            .spawn()
            .map_err(|e| match e.kind() {
                io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied => {
                    TranscodeError::Unavailable(format!("{}: {}", self.binary.display(), e))
                }
                _ => io_error(e),
            })?;
        log::info!("Transcoder started (pid {}) with {} input bytes", child.id(), input.len());

        let status = loop {
            if cancel.is_cancelled() {
                log::info!("Transcode cancelled; killing pid {}", child.id());
                child.kill().ok();
                child.wait().ok();
                return Err(TranscodeError::Cancelled);
            }
            match child.try_wait().map_err(io_error)? {
                Some(status) => break status,
                None => thread::sleep(self.poll_interval),
            }
        };

        if !status.success() {
            let stderr = read_tail(&scratch.join(STDERR_LOG_NAME));
            return Err(TranscodeError::Failed {
                status: status.code().unwrap_or(-1),
                stderr,
            });
        }

        fs::read(scratch.join(TRANSCODE_OUTPUT_NAME)).map_err(|e| TranscodeError::Failed {
            status: 0,
            stderr: format!("no output produced: {}", e),
        })
    }
}

impl Transcoder for FfmpegTranscoder {
    fn transcode(
        &self,
        input: &[u8],
        argv: &[String],
        cancel: &CancellationToken,
    ) -> Result<Vec<u8>, TranscodeError> {
        if cancel.is_cancelled() {
            return Err(TranscodeError::Cancelled);
        }

        let scratch = ScratchDir::create(&self.scratch_root)?;
        self.run(&scratch.path, input, argv, cancel)
    }
}

/// Scratch directory removed on drop.
struct ScratchDir {
    path: PathBuf,
}

impl ScratchDir {
    fn create(root: &Path) -> Result<Self, TranscodeError> {
        let path = root.join(format!("transcode-{}", uuid::Uuid::new_v4()));
        fs::create_dir_all(&path).map_err(io_error)?;
        Ok(Self { path })
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_dir_all(&self.path) {
            log::warn!("Failed to remove scratch directory {}: {}", self.path.display(), e);
        }
    }
}

fn io_error(e: io::Error) -> TranscodeError {
    TranscodeError::Io(e.to_string())
}

fn read_tail(path: &Path) -> String {
    let bytes = fs::read(path).unwrap_or_default();
    let start = bytes.len().saturating_sub(STDERR_TAIL_BYTES);
    String::from_utf8_lossy(&bytes[start..]).trim().to_string()
}

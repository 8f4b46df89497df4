use std::time::Duration;

use crate::models::config::RecorderConfiguration;
use crate::models::error::RecorderError;
use crate::traits::capability::FormatSupport;

/// Recorder output formats in order of preference.
pub const MIME_PREFERENCES: &[&str] = &[
    "video/webm;codecs=avc1",
    "video/webm;codecs=vp8,opus",
    "video/webm;codecs=vp9,opus",
    "video/webm;codecs=vp9",
    "video/webm;codecs=vp8",
    "video/webm;codecs=h264",
    "video/webm",
];

/// Fixed transcoder arguments: webm fragments in, 30 fps mp4 out, speed preset.
pub const TRANSCODE_ARGS: &[&str] = &[
    "-i",
    "input.webm",
    "-preset",
    "superfast",
    "-threads",
    "0",
    "-r",
    "30",
    "-tune",
    "fastdecode",
    "output.mp4",
];

/// Input file name the transcoder arguments refer to.
pub const TRANSCODE_INPUT_NAME: &str = "input.webm";

/// Output file name the transcoder arguments refer to.
pub const TRANSCODE_OUTPUT_NAME: &str = "output.mp4";

pub fn transcode_argv() -> Vec<String> {
    TRANSCODE_ARGS.iter().map(|s| s.to_string()).collect()
}

/// Return the first entry of `preferences` that `support` accepts.
pub fn select_mime_type<'a>(
    preferences: &[&'a str],
    support: &dyn FormatSupport,
) -> Result<&'a str, RecorderError> {
    preferences
        .iter()
        .copied()
        .find(|mime| support.is_type_supported(mime))
        .ok_or_else(|| RecorderError::CapabilityUnavailable("no supported recording format".into()))
}

/// Options handed to the capture source when recording starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncoderOptions {
    pub mime_type: String,
    pub audio_bits_per_second: u32,
    pub video_bits_per_second: u32,
    /// Fragment timeslice.
    pub timeslice: Duration,
}

impl EncoderOptions {
    pub fn for_configuration(
        config: &RecorderConfiguration,
        support: &dyn FormatSupport,
    ) -> Result<Self, RecorderError> {
        let mime_type = select_mime_type(MIME_PREFERENCES, support)?;
        let bitrates = config.settings.quality.bitrates();
        Ok(Self {
            mime_type: mime_type.to_string(),
            audio_bits_per_second: bitrates.audio_bps,
            video_bits_per_second: bitrates.video_bps,
            timeslice: config.chunk_interval,
        })
    }
}

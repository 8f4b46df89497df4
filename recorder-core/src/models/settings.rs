use serde::{Deserialize, Serialize};

/// Recording quality preset.
///
/// Deserializes leniently: an unknown label falls back to 1080p.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(from = "String")]
pub enum Quality {
    #[serde(rename = "4k")]
    Uhd4k,
    #[default]
    #[serde(rename = "1080p")]
    P1080,
    #[serde(rename = "720p")]
    P720,
    #[serde(rename = "480p")]
    P480,
    #[serde(rename = "360p")]
    P360,
    #[serde(rename = "240p")]
    P240,
}

/// Target bitrates in bits per second.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bitrates {
    pub audio_bps: u32,
    pub video_bps: u32,
}

/// Target capture resolution in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Quality {
    /// Parse a preset label such as `"720p"`; unknown labels fall back to 1080p.
    pub fn from_label(label: &str) -> Self {
        match label {
            "4k" => Self::Uhd4k,
            "1080p" => Self::P1080,
            "720p" => Self::P720,
            "480p" => Self::P480,
            "360p" => Self::P360,
            "240p" => Self::P240,
            _ => Self::default(),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Uhd4k => "4k",
            Self::P1080 => "1080p",
            Self::P720 => "720p",
            Self::P480 => "480p",
            Self::P360 => "360p",
            Self::P240 => "240p",
        }
    }

    pub fn bitrates(&self) -> Bitrates {
        let (audio_bps, video_bps) = match self {
            Self::Uhd4k => (128_000, 25_000_000),
            Self::P1080 => (128_000, 6_000_000),
            Self::P720 => (96_000, 3_000_000),
            Self::P480 => (64_000, 1_500_000),
            Self::P360 => (64_000, 800_000),
            Self::P240 => (48_000, 400_000),
        };
        Bitrates { audio_bps, video_bps }
    }

    pub fn resolution(&self) -> Resolution {
        let (width, height) = match self {
            Self::Uhd4k => (3840, 2160),
            Self::P1080 => (1920, 1080),
            Self::P720 => (1280, 720),
            Self::P480 => (854, 480),
            Self::P360 => (640, 360),
            Self::P240 => (426, 240),
        };
        Resolution { width, height }
    }

    /// 4k and 1080p cap the capture size at the preset instead of treating it as a hint.
    pub fn caps_resolution(&self) -> bool {
        matches!(self, Self::Uhd4k | Self::P1080)
    }
}

impl From<String> for Quality {
    fn from(label: String) -> Self {
        Self::from_label(&label)
    }
}

/// Supported capture frame rates.
pub const FRAME_RATES: [u32; 2] = [60, 120];

/// User-facing recording settings, persisted between runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordingSettings {
    pub quality: Quality,
    pub fps: u32,
    pub mic_active: bool,
    pub echo_cancellation: bool,
}

impl RecordingSettings {
    pub fn validate(&self) -> Result<(), String> {
        if !FRAME_RATES.contains(&self.fps) {
            return Err(format!("unsupported frame rate: {}", self.fps));
        }
        Ok(())
    }
}

impl Default for RecordingSettings {
    fn default() -> Self {
        Self {
            quality: Quality::P1080,
            fps: 60,
            mic_active: true,
            echo_cancellation: true,
        }
    }
}

use serde::{Deserialize, Serialize};

/// Type of audio source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioTrackType {
    /// Microphone input, the primary signal.
    Mic,
    /// System/display audio, the echo reference.
    System,
}

/// An audio track offered by a capture device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioSource {
    pub id: String,
    pub name: String,
    pub source_type: AudioTrackType,
}

impl AudioSource {
    pub fn mic(id: &str) -> Self {
        Self {
            id: id.to_string(),
            name: "Microphone".into(),
            source_type: AudioTrackType::Mic,
        }
    }

    pub fn system(id: &str) -> Self {
        Self {
            id: id.to_string(),
            name: "System Audio".into(),
            source_type: AudioTrackType::System,
        }
    }
}

/// Fixed gain applied to the microphone in direct and mic-only mixes.
pub const MIC_GAIN: f32 = 1.0;

/// Fixed gain applied to the system reference in direct and reference-only mixes.
pub const REFERENCE_GAIN: f32 = 0.5;

/// Which audio graph is active for a session.
///
/// Chosen once at assembly time and fixed until the graph is torn down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioTopology {
    /// Mic through the adaptive filter with system audio as reference.
    FilteredMix,
    /// Mic and system audio summed at fixed gains.
    DirectMix,
    /// Mic alone.
    MicOnly,
    /// System audio alone.
    ReferenceOnly,
    /// No audio sources; the destination renders silence.
    Silent,
}

impl AudioTopology {
    /// Select a topology from source availability and the latched filter toggle.
    pub fn select(mic_present: bool, reference_present: bool, filter_enabled: bool) -> Self {
        match (mic_present, reference_present) {
            (true, true) if filter_enabled => Self::FilteredMix,
            (true, true) => Self::DirectMix,
            (true, false) => Self::MicOnly,
            (false, true) => Self::ReferenceOnly,
            (false, false) => Self::Silent,
        }
    }

    /// `(mic_gain, reference_gain)` applied at the destination.
    ///
    /// The filtered mix writes the filter output straight to the destination.
    pub fn gains(&self) -> (f32, f32) {
        match self {
            Self::FilteredMix => (1.0, 0.0),
            Self::DirectMix => (MIC_GAIN, REFERENCE_GAIN),
            Self::MicOnly => (MIC_GAIN, 0.0),
            Self::ReferenceOnly => (0.0, REFERENCE_GAIN),
            Self::Silent => (0.0, 0.0),
        }
    }

    pub fn uses_filter(&self) -> bool {
        matches!(self, Self::FilteredMix)
    }
}

/// Real-time audio level metering (RMS and peak, 0.0–1.0).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AudioLevels {
    pub mic_level: f32,
    pub system_level: f32,
    pub peak_mic_level: f32,
    pub peak_system_level: f32,
}

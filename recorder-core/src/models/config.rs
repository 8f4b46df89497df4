use std::time::Duration;

use super::settings::RecordingSettings;

/// Minimum free storage before a session is aborted (25 MiB).
pub const DEFAULT_MIN_FREE_BYTES: u64 = 25 * 1024 * 1024;

/// How long a stopped session waits for the source's flush fragment.
pub const DEFAULT_GRACE_PERIOD: Duration = Duration::from_secs(3);

/// Timeslice requested from the capture source.
pub const DEFAULT_CHUNK_INTERVAL: Duration = Duration::from_millis(500);

/// Adaptive filter construction options.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterOptions {
    /// Number of taps. Controls adaptation memory and per-sample cost.
    pub filter_length: usize,
    /// LMS step size `mu`. Trades convergence speed against stability.
    pub step_size: f32,
}

impl FilterOptions {
    pub fn validate(&self) -> Result<(), String> {
        if self.filter_length == 0 {
            return Err("filter length must be positive".into());
        }
        if !self.step_size.is_finite() || self.step_size <= 0.0 {
            return Err(format!("step size must be positive and finite: {}", self.step_size));
        }
        Ok(())
    }
}

impl Default for FilterOptions {
    fn default() -> Self {
        Self {
            filter_length: 128,
            step_size: 0.01,
        }
    }
}

/// Configuration for a recorder.
#[derive(Debug, Clone, PartialEq)]
pub struct RecorderConfiguration {
    /// Adaptive filter shape, used when the filtered mix is selected.
    pub filter: FilterOptions,

    /// Abort the session when available storage drops below this (default: 25 MiB).
    pub min_free_bytes: u64,

    /// Wait for the source's flush fragment after stop (default: 3s).
    pub grace_period: Duration,

    /// Fragment timeslice requested from the capture source (default: 500ms).
    pub chunk_interval: Duration,

    /// Quality, frame rate and source toggles.
    pub settings: RecordingSettings,
}

impl RecorderConfiguration {
    /// Configuration with default tuning around persisted user settings.
    pub fn with_settings(settings: RecordingSettings) -> Self {
        Self {
            settings,
            ..Default::default()
        }
    }

    /// Whether the filtered mix is requested. Follows the user's echo
    /// cancellation setting and is latched at graph assembly.
    pub fn filter_enabled(&self) -> bool {
        self.settings.echo_cancellation
    }

    pub fn validate(&self) -> Result<(), String> {
        self.filter.validate()?;
        self.settings.validate()?;
        if self.chunk_interval.is_zero() {
            return Err("chunk interval must be positive".into());
        }
        Ok(())
    }
}

impl Default for RecorderConfiguration {
    fn default() -> Self {
        Self {
            filter: FilterOptions::default(),
            min_free_bytes: DEFAULT_MIN_FREE_BYTES,
            grace_period: DEFAULT_GRACE_PERIOD,
            chunk_interval: DEFAULT_CHUNK_INTERVAL,
            settings: RecordingSettings::default(),
        }
    }
}

use std::sync::Arc;

use crate::models::audio_models::{AudioLevels, AudioSource, AudioTopology, AudioTrackType};
use crate::models::config::{FilterOptions, RecorderConfiguration};
use crate::models::error::RecorderError;
use crate::processing::adaptive_filter::LmsFilter;
use crate::processing::levels;
use crate::traits::capability::ProcessingEnvironment;

/// Builds the per-session audio graph from the available sources.
///
/// ```text
/// filtered-mix:   [Mic] ─ primary ──┐
///                                   ├→ [LmsFilter] → [Destination]
///                 [System] ─ ref ───┘
///
/// direct-mix:     [Mic] × 1.0 ──┐
///                               ├→ [Destination]
///                 [System] × 0.5┘
/// ```
pub struct AudioGraphAssembler {
    environment: Arc<dyn ProcessingEnvironment>,
    filter_options: FilterOptions,
    filter_enabled: bool,
}

impl AudioGraphAssembler {
    /// Assembler with the filtered mix requested by default.
    pub fn new(environment: Arc<dyn ProcessingEnvironment>, filter_options: FilterOptions) -> Self {
        Self {
            environment,
            filter_options,
            filter_enabled: true,
        }
    }

    /// Assembler that takes its filter shape and toggle from `config`.
    pub fn from_configuration(environment: Arc<dyn ProcessingEnvironment>, config: &RecorderConfiguration) -> Self {
        Self {
            environment,
            filter_options: config.filter,
            filter_enabled: config.filter_enabled(),
        }
    }

    /// Build the graph for `sources` with the configured filter toggle.
    pub fn assemble_configured(&self, sources: &[AudioSource]) -> Result<AudioGraph, RecorderError> {
        self.assemble(sources, self.filter_enabled)
    }

    /// Pick a topology and build its graph.
    ///
    /// `filter_enabled` is read once here; changing it later needs a new graph.
    /// Fails with `CapabilityUnavailable` if the filtered mix is selected but
    /// the environment cannot run custom per-sample processing.
    pub fn assemble(&self, sources: &[AudioSource], filter_enabled: bool) -> Result<AudioGraph, RecorderError> {
        let mic_present = sources.iter().any(|s| s.source_type == AudioTrackType::Mic);
        let reference_present = sources.iter().any(|s| s.source_type == AudioTrackType::System);
        let topology = AudioTopology::select(mic_present, reference_present, filter_enabled);

        let filter = if topology.uses_filter() {
            if !self.environment.supports_custom_processing() {
                return Err(RecorderError::CapabilityUnavailable(
                    "adaptive filter requires custom per-sample processing".into(),
                ));
            }
            self.filter_options
                .validate()
                .map_err(RecorderError::ConfigurationFailed)?;
            Some(LmsFilter::new(self.filter_options))
        } else {
            None
        };

        log::info!(
            "Assembled audio graph: {:?} (mic: {}, reference: {}, filter requested: {})",
            topology,
            mic_present,
            reference_present,
            filter_enabled
        );

        Ok(AudioGraph::new(topology, filter))
    }
}

/// A session's audio graph: one topology, its gain stages and, for the
/// filtered mix, the filter state.
///
/// `render` runs on the audio thread and does not allocate.
#[derive(Debug)]
pub struct AudioGraph {
    topology: AudioTopology,
    filter: Option<LmsFilter>,
    mic_gain: f32,
    reference_gain: f32,
    levels: AudioLevels,
}

impl AudioGraph {
    fn new(topology: AudioTopology, filter: Option<LmsFilter>) -> Self {
        let (mic_gain, reference_gain) = topology.gains();
        Self {
            topology,
            filter,
            mic_gain,
            reference_gain,
            levels: AudioLevels::default(),
        }
    }

    pub fn topology(&self) -> AudioTopology {
        self.topology
    }

    pub fn filter(&self) -> Option<&LmsFilter> {
        self.filter.as_ref()
    }

    /// Input levels measured on the last rendered block.
    pub fn levels(&self) -> AudioLevels {
        self.levels
    }

    /// Render one block into `output`.
    ///
    /// Missing or short inputs count as silence.
    pub fn render(&mut self, mic: Option<&[f32]>, reference: Option<&[f32]>, output: &mut [f32]) {
        self.meter(mic, reference);

        if let Some(filter) = self.filter.as_mut() {
            filter.process_block(mic, reference, output);
            return;
        }

        let mic = mic.unwrap_or(&[]);
        let reference = reference.unwrap_or(&[]);
        for (i, out) in output.iter_mut().enumerate() {
            let m = mic.get(i).copied().unwrap_or(0.0);
            let r = reference.get(i).copied().unwrap_or(0.0);
            *out = m * self.mic_gain + r * self.reference_gain;
        }
    }

    fn meter(&mut self, mic: Option<&[f32]>, reference: Option<&[f32]>) {
        let mic = levels::measure(mic.unwrap_or(&[]));
        let reference = levels::measure(reference.unwrap_or(&[]));
        self.levels = AudioLevels {
            mic_level: mic.rms,
            system_level: reference.rms,
            peak_mic_level: mic.peak,
            peak_system_level: reference.peak,
        };
    }
}

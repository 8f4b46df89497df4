/// RMS and peak of one block, measured in a single pass.
///
/// An empty block (a missing input) reads as silence.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BlockLevel {
    pub rms: f32,
    pub peak: f32,
}

pub fn measure(samples: &[f32]) -> BlockLevel {
    if samples.is_empty() {
        return BlockLevel::default();
    }
    let (energy, peak) = samples
        .iter()
        .fold((0.0f32, 0.0f32), |(energy, peak), &s| (energy + s * s, peak.max(s.abs())));
    BlockLevel {
        rms: (energy / samples.len() as f32).sqrt(),
        peak,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn sine_block_rms_is_peak_over_root_two() {
        let samples: Vec<f32> = (0..480)
            .map(|i| 0.8 * (2.0 * std::f32::consts::PI * i as f32 / 48.0).sin())
            .collect();

        let level = measure(&samples);

        assert_relative_eq!(level.rms, 0.8 / std::f32::consts::SQRT_2, epsilon = 1e-3);
        assert_relative_eq!(level.peak, 0.8, epsilon = 1e-3);
    }

    #[test]
    fn peak_tracks_negative_excursions() {
        let level = measure(&[0.1, -0.9, 0.2]);
        assert_relative_eq!(level.peak, 0.9);
    }

    #[test]
    fn missing_input_is_silent() {
        assert_eq!(measure(&[]), BlockLevel::default());
    }
}

use crate::models::config::FilterOptions;

/// Per-sample LMS adaptive echo canceller.
///
/// Removes the estimated echo of a reference signal (system audio) from a
/// primary signal (microphone). The tap weights adapt every sample with the
/// plain LMS rule:
///
/// ```text
/// y = Σ w[j] · x[n - j]
/// e = d[n] - y
/// w[j] += 2 · mu · e · x[n - j]
/// ```
///
/// There is no power normalization and no divergence guard: `mu` has to be
/// chosen small enough for the expected reference amplitude.
///
/// Intended for the audio render thread. `process_block` and
/// `process_sample` do not allocate, lock or perform I/O.
#[derive(Debug, Clone)]
pub struct LmsFilter {
    weights: Vec<f32>,
    /// Circular buffer of the most recent reference samples.
    history: Vec<f32>,
    /// Slot the next reference sample is written to.
    write_index: usize,
    step_size: f32,
}

impl LmsFilter {
    /// Create a filter with all weights and history zeroed.
    ///
    /// Panics if `options.filter_length` is zero.
    pub fn new(options: FilterOptions) -> Self {
        assert!(options.filter_length > 0, "filter length must be positive");
        Self {
            weights: vec![0.0; options.filter_length],
            history: vec![0.0; options.filter_length],
            write_index: 0,
            step_size: options.step_size,
        }
    }

    /// Filter one block, writing the error signal into `output`.
    ///
    /// When either input is missing the block passes `primary` through (or
    /// silence) and the filter does not adapt. Mismatched lengths are
    /// truncated to the shortest of the three slices; any remaining output
    /// samples are silenced.
    pub fn process_block(&mut self, primary: Option<&[f32]>, reference: Option<&[f32]>, output: &mut [f32]) {
        let (primary, reference) = match (primary, reference) {
            (Some(p), Some(r)) => (p, r),
            (primary, _) => {
                pass_through(primary, output);
                return;
            }
        };

        let len = output.len().min(primary.len()).min(reference.len());
        for i in 0..len {
            output[i] = self.process_sample(primary[i], reference[i]);
        }
        output[len..].fill(0.0);
    }

    /// Filter a single sample pair and return the error sample.
    #[inline]
    pub fn process_sample(&mut self, primary: f32, reference: f32) -> f32 {
        let n = self.history.len();
        self.history[self.write_index] = reference;

        // Tap j pairs with the sample written j steps ago.
        let mut estimate = 0.0f32;
        let mut idx = self.write_index;
        for &w in &self.weights {
            estimate += w * self.history[idx];
            idx = if idx == 0 { n - 1 } else { idx - 1 };
        }

        let error = primary - estimate;

        let gain = 2.0 * self.step_size * error;
        let mut idx = self.write_index;
        for w in self.weights.iter_mut() {
            *w += gain * self.history[idx];
            idx = if idx == 0 { n - 1 } else { idx - 1 };
        }

        self.write_index = (self.write_index + 1) % n;
        error
    }

    /// Zero the weights and history.
    pub fn reset(&mut self) {
        self.weights.fill(0.0);
        self.history.fill(0.0);
        self.write_index = 0;
    }

    pub fn filter_length(&self) -> usize {
        self.weights.len()
    }

    pub fn step_size(&self) -> f32 {
        self.step_size
    }

    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    pub fn write_index(&self) -> usize {
        self.write_index
    }

    /// Reference history ordered oldest to newest. Allocates; diagnostics only.
    pub fn recent_history(&self) -> Vec<f32> {
        let mut ordered = Vec::with_capacity(self.history.len());
        ordered.extend_from_slice(&self.history[self.write_index..]);
        ordered.extend_from_slice(&self.history[..self.write_index]);
        ordered
    }
}

fn pass_through(primary: Option<&[f32]>, output: &mut [f32]) {
    match primary {
        Some(p) => {
            let len = p.len().min(output.len());
            output[..len].copy_from_slice(&p[..len]);
            output[len..].fill(0.0);
        }
        None => output.fill(0.0),
    }
}

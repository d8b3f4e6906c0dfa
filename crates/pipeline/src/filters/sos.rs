//! Cascaded second-order sections with zero-phase (forward-backward) filtering.

/// Biquad coefficients, `a0` normalized to 1:
/// `H(z) = (b0 + b1 z^-1 + b2 z^-2) / (1 + a1 z^-1 + a2 z^-2)`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FilterCoefficients {
    pub b0: f64,
    pub b1: f64,
    pub b2: f64,
    pub a1: f64,
    pub a2: f64,
}

impl FilterCoefficients {
    /// Gain at DC, or `None` when the section has a pole at z = 1.
    fn dc_gain(&self) -> Option<f64> {
        let den = 1.0 + self.a1 + self.a2;
        if den.abs() < f64::EPSILON {
            return None;
        }
        Some((self.b0 + self.b1 + self.b2) / den)
    }
}

// Direct Form II Transposed section
#[derive(Clone, Debug)]
struct DigitalFilter {
    coeffs: FilterCoefficients,
    z1: f64,
    z2: f64,
}

impl DigitalFilter {
    fn with_state(coeffs: FilterCoefficients, z1: f64, z2: f64) -> Self {
        Self { coeffs, z1, z2 }
    }

    #[inline]
    fn process(&mut self, x: f64) -> f64 {
        let y = self.coeffs.b0 * x + self.z1;
        self.z1 = self.coeffs.b1 * x - self.coeffs.a1 * y + self.z2;
        self.z2 = self.coeffs.b2 * x - self.coeffs.a2 * y;
        y
    }
}

/// An IIR filter expressed as a cascade of biquads.
#[derive(Clone, Debug, PartialEq)]
pub struct SosFilter {
    sections: Vec<FilterCoefficients>,
}

impl SosFilter {
    pub fn new(sections: Vec<FilterCoefficients>) -> Self {
        Self { sections }
    }

    pub fn sections(&self) -> &[FilterCoefficients] {
        &self.sections
    }

    /// Order of the overall transfer function.
    pub fn order(&self) -> usize {
        2 * self.sections.len()
    }

    /// Samples of odd extension added at each end before zero-phase filtering.
    pub fn pad_len(&self) -> usize {
        let trailing_b = self.sections.iter().filter(|s| s.b2 == 0.0).count();
        let trailing_a = self.sections.iter().filter(|s| s.a2 == 0.0).count();
        3 * (2 * self.sections.len() + 1 - trailing_b.min(trailing_a))
    }

    /// Causal filtering with the delay lines preset to the steady state of a
    /// constant input equal to `initial`.
    pub fn filter(&self, samples: &[f64], initial: f64) -> Vec<f64> {
        let mut cascade = self.steady_state(initial);
        samples
            .iter()
            .map(|&x| cascade.iter_mut().fold(x, |acc, section| section.process(acc)))
            .collect()
    }

    /// Zero-phase filtering: forward pass, then a backward pass over the
    /// reversed output, on an odd extension of the input. Output length
    /// equals input length.
    pub fn filtfilt(&self, samples: &[f64]) -> Vec<f64> {
        if samples.is_empty() {
            return Vec::new();
        }
        let pad = self.pad_len().min(samples.len() - 1);
        let extended = odd_extension(samples, pad);

        let mut forward = self.filter(&extended, extended[0]);
        forward.reverse();
        let mut backward = self.filter(&forward, forward[0]);
        backward.reverse();

        backward[pad..pad + samples.len()].to_vec()
    }

    fn steady_state(&self, initial: f64) -> Vec<DigitalFilter> {
        let mut level = initial;
        self.sections
            .iter()
            .map(|&coeffs| match coeffs.dc_gain() {
                Some(gain) => {
                    let out = gain * level;
                    let z2 = coeffs.b2 * level - coeffs.a2 * out;
                    let z1 = coeffs.b1 * level - coeffs.a1 * out + z2;
                    level = out;
                    DigitalFilter::with_state(coeffs, z1, z2)
                }
                None => {
                    level = 0.0;
                    DigitalFilter::with_state(coeffs, 0.0, 0.0)
                }
            })
            .collect()
    }
}

/// Point-reflect `n` samples about each endpoint: `2*x[0] - x[n..1]` before
/// and `2*x[last] - x[last-1..last-n]` after.
fn odd_extension(samples: &[f64], n: usize) -> Vec<f64> {
    let len = samples.len();
    let first = samples[0];
    let last = samples[len - 1];

    let mut extended = Vec::with_capacity(len + 2 * n);
    extended.extend((1..=n).rev().map(|i| 2.0 * first - samples[i]));
    extended.extend_from_slice(samples);
    extended.extend((1..=n).map(|i| 2.0 * last - samples[len - 1 - i]));
    extended
}

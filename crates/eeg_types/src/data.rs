use serde::{Deserialize, Serialize};

/// Sampling rate assumed when a header does not state one.
pub const DEFAULT_SAMPLING_RATE: u32 = 512;

/// Recording metadata recovered from the header file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    /// Samples per second, always positive.
    pub sampling_rate: u32,
}

impl Default for Header {
    fn default() -> Self {
        Self { sampling_rate: DEFAULT_SAMPLING_RATE }
    }
}

/// A single-channel recording as loaded from disk.
///
/// Immutable once constructed; the filter pipeline produces a separate
/// [`CleanedSignal`] of the same length.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSignal {
    samples: Vec<f64>,
    sampling_rate: u32,
}

impl RawSignal {
    pub fn new(samples: Vec<f64>, sampling_rate: u32) -> Self {
        Self { samples, sampling_rate }
    }

    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    pub fn sampling_rate(&self) -> u32 {
        self.sampling_rate
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration covered by the samples, in seconds.
    pub fn duration_secs(&self) -> f64 {
        if self.sampling_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sampling_rate as f64
    }
}

/// Output of the filter pipeline: same length and rate as its source.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanedSignal {
    samples: Vec<f64>,
    sampling_rate: u32,
}

impl CleanedSignal {
    pub fn new(samples: Vec<f64>, sampling_rate: u32) -> Self {
        Self { samples, sampling_rate }
    }

    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    pub fn sampling_rate(&self) -> u32 {
        self.sampling_rate
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn into_samples(self) -> Vec<f64> {
        self.samples
    }
}

/// Diagnostics comparing the recording against its cleaned version.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct QualityMetrics {
    /// Estimated SNR in dB; `+inf` when the removed component has no variance.
    pub snr_db: f64,
    /// Number of samples in the recording whose |z| exceeds the artifact threshold.
    pub artifacts_removed: usize,
    /// `var(original) / var(cleaned)`
    pub variance_reduction_ratio: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_header_rate() {
        assert_eq!(Header::default().sampling_rate, 512);
    }

    #[test]
    fn test_raw_signal_duration() {
        let signal = RawSignal::new(vec![0.0; 1024], 512);
        assert_eq!(signal.len(), 1024);
        assert!((signal.duration_secs() - 2.0).abs() < f64::EPSILON);
        assert_eq!(RawSignal::new(vec![1.0], 0).duration_secs(), 0.0);
    }
}

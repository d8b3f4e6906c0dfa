//! Band power analysis of a cleaned recording.

use eeg_types::{AnalysisError, AnalysisResult, BandPowerResult, CleanedSignal, FREQUENCY_BANDS};
use num_complex::Complex64;
use rustfft::FftPlanner;
use tracing::{debug, info};

/// Length of the analysis window, in seconds.
pub const ANALYSIS_WINDOW_SECS: u32 = 2;

/// Computes per-band power over the leading analysis window of a signal.
pub struct SpectralAnalyzer {
    sampling_rate: u32,
    planner: FftPlanner<f64>,
}

impl SpectralAnalyzer {
    pub fn new(sampling_rate: u32) -> Self {
        Self {
            sampling_rate,
            planner: FftPlanner::new(),
        }
    }

    pub fn name(&self) -> &'static str {
        "brain_waves_fft"
    }

    /// Samples analyzed for a signal of `len`: at most two seconds' worth.
    pub fn window_len(&self, len: usize) -> usize {
        let max = self.sampling_rate as usize * ANALYSIS_WINDOW_SECS as usize;
        len.min(max)
    }

    /// Frequency of bin `k` for an `n`-point transform.
    pub fn bin_frequency(&self, k: usize, n: usize) -> f64 {
        k as f64 * self.sampling_rate as f64 / n as f64
    }

    /// DFT of `samples` restricted to bins `0..=n/2`.
    pub fn positive_spectrum(&mut self, samples: &[f64]) -> Vec<Complex64> {
        let n = samples.len();
        if n == 0 {
            return Vec::new();
        }
        let fft = self.planner.plan_fft_forward(n);
        let mut buffer: Vec<Complex64> = samples.iter().map(|&v| Complex64::new(v, 0.0)).collect();
        fft.process(&mut buffer);
        buffer.truncate(n / 2 + 1);
        buffer
    }

    /// Sum of squared magnitudes per band over the analysis window.
    ///
    /// Band edges are inclusive, so a bin on a shared edge counts toward
    /// both neighbours. An empty signal is an `EmptySpectrum` error.
    pub fn band_powers(&mut self, signal: &CleanedSignal) -> AnalysisResult<BandPowerResult> {
        info!("[{}] Analyzing frequency bands...", self.name());
        let n = self.window_len(signal.len());
        if n == 0 {
            return Err(AnalysisError::EmptySpectrum);
        }

        let spectrum = self.positive_spectrum(&signal.samples()[..n]);
        let mut result = BandPowerResult::new();
        for band in FREQUENCY_BANDS.iter() {
            let power: f64 = spectrum
                .iter()
                .enumerate()
                .filter(|(k, _)| band.contains(self.bin_frequency(*k, n)))
                .map(|(_, c)| c.norm_sqr())
                .sum();
            debug!("[{}] {} ({}) power {}", self.name(), band.name, band.range_label(), power);
            result.insert(band, power);
        }
        Ok(result)
    }
}

/// Total spectral energy of an `n`-point window, `n * sum(x^2)` by Parseval.
pub fn spectral_energy(samples: &[f64]) -> f64 {
    samples.len() as f64 * samples.iter().map(|x| x * x).sum::<f64>()
}

//! Smoothing stage
//!
//! Cubic Savitzky-Golay smoothing when the signal can host the window,
//! otherwise a centered moving average over half the window.

use eeg_types::{AnalysisError, AnalysisResult};
use nalgebra::{DMatrix, DVector};
use num_complex::Complex64;
use rustfft::FftPlanner;
use tracing::{debug, info};

use crate::config::{SMOOTHING_MIN_WINDOW, SMOOTHING_POLYORDER, SMOOTHING_WINDOW_FRACTION};
use crate::stage::{PipelineStage, StageMetric};

/// Savitzky-Golay window for a sampling rate: 1% of the rate, at least
/// `SMOOTHING_MIN_WINDOW`, bumped to the next odd number.
pub fn smoothing_window(sampling_rate: u32) -> usize {
    let window = ((sampling_rate as f64 * SMOOTHING_WINDOW_FRACTION) as usize).max(SMOOTHING_MIN_WINDOW);
    if window % 2 == 0 {
        window + 1
    } else {
        window
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmoothingStrategy {
    SavitzkyGolay { window: usize, polyorder: usize },
    MovingAverage { window: usize },
}

impl SmoothingStrategy {
    /// Pick the polynomial fit when `polyorder < window <= len`, else fall
    /// back to a moving average of `window / 2`.
    pub fn select(window: usize, polyorder: usize, len: usize) -> Self {
        if polyorder < window && window <= len {
            SmoothingStrategy::SavitzkyGolay { window, polyorder }
        } else {
            SmoothingStrategy::MovingAverage { window: (window / 2).max(1) }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SmoothingStrategy::SavitzkyGolay { .. } => "savitzky_golay",
            SmoothingStrategy::MovingAverage { .. } => "moving_average",
        }
    }

    pub fn window(&self) -> usize {
        match *self {
            SmoothingStrategy::SavitzkyGolay { window, .. } => window,
            SmoothingStrategy::MovingAverage { window } => window,
        }
    }

    pub fn apply(&self, samples: &[f64]) -> AnalysisResult<Vec<f64>> {
        match *self {
            SmoothingStrategy::SavitzkyGolay { window, polyorder } => {
                savitzky_golay(samples, window, polyorder)
            }
            SmoothingStrategy::MovingAverage { window } => Ok(moving_average(samples, window)),
        }
    }
}

#[derive(Debug)]
pub struct SmoothingStage {
    window: usize,
    polyorder: usize,
    last_strategy: Option<SmoothingStrategy>,
}

impl SmoothingStage {
    pub fn new(sampling_rate: u32) -> Self {
        Self {
            window: smoothing_window(sampling_rate),
            polyorder: SMOOTHING_POLYORDER,
            last_strategy: None,
        }
    }

    pub fn window(&self) -> usize {
        self.window
    }

    pub fn last_strategy(&self) -> Option<SmoothingStrategy> {
        self.last_strategy
    }
}

impl PipelineStage for SmoothingStage {
    fn process(&mut self, input: Vec<f64>) -> AnalysisResult<Vec<f64>> {
        info!("Smoothing signal...");
        let strategy = SmoothingStrategy::select(self.window, self.polyorder, input.len());
        debug!(
            "Smoothing {} samples with {} (window {})",
            input.len(),
            strategy.name(),
            strategy.window()
        );
        self.last_strategy = Some(strategy);
        strategy.apply(&input)
    }

    fn stage_type(&self) -> &'static str {
        "smoothing"
    }

    fn description(&self) -> &'static str {
        "Cubic Savitzky-Golay smoothing with moving-average fallback"
    }

    fn get_metrics(&self) -> Vec<StageMetric> {
        match self.last_strategy {
            Some(strategy) => {
                let code = match strategy {
                    SmoothingStrategy::SavitzkyGolay { .. } => 0.0,
                    SmoothingStrategy::MovingAverage { .. } => 1.0,
                };
                vec![
                    StageMetric::with_description("strategy", code, "enum", strategy.name()),
                    StageMetric::new("window", strategy.window() as f64, "samples"),
                ]
            }
            None => vec![StageMetric::new("window", self.window as f64, "samples")],
        }
    }
}

/// Kernels up to this length are applied directly; longer ones through
/// overlap-save FFT blocks.
const DIRECT_KERNEL_MAX: usize = 64;

/// Design matrix of a window in powers of the normalized abscissa
/// (-1 is the first sample, 1 the last).
fn vandermonde(window: usize, polyorder: usize) -> DMatrix<f64> {
    let half = (window / 2) as f64;
    DMatrix::from_fn(window, polyorder + 1, |row, col| {
        ((row as f64 - half) / half).powi(col as i32)
    })
}

fn singular(window: usize, polyorder: usize) -> AnalysisError {
    AnalysisError::filter_design(format!(
        "singular Savitzky-Golay system (window {}, polyorder {})",
        window, polyorder
    ))
}

/// Least-squares polynomial through `window_samples`, lowest power first.
fn fit_polynomial(design: &DMatrix<f64>, polyorder: usize, window_samples: &[f64]) -> AnalysisResult<DVector<f64>> {
    let rhs = design.transpose() * DVector::from_column_slice(window_samples);
    let normal = design.transpose() * design;
    normal.lu().solve(&rhs).ok_or_else(|| singular(window_samples.len(), polyorder))
}

fn eval_polynomial(coeffs: &DVector<f64>, u: f64) -> f64 {
    coeffs.iter().rev().fold(0.0, |acc, c| acc * u + c)
}

/// Savitzky-Golay smoothing. Edge samples are taken from the polynomial
/// fitted once to each of the first and last full windows.
pub fn savitzky_golay(samples: &[f64], window: usize, polyorder: usize) -> AnalysisResult<Vec<f64>> {
    if window % 2 == 0 || polyorder >= window || window > samples.len() {
        return Err(AnalysisError::filter_design(format!(
            "Savitzky-Golay needs an odd window in ({}, {}], got {}",
            polyorder,
            samples.len(),
            window
        )));
    }
    let len = samples.len();
    let half = window / 2;
    let design = vandermonde(window, polyorder);

    // Center weights: the fitted polynomial evaluated at u = 0.
    let unit = DVector::from_fn(polyorder + 1, |k, _| if k == 0 { 1.0 } else { 0.0 });
    let normal = design.transpose() * &design;
    let center = &design * normal.lu().solve(&unit).ok_or_else(|| singular(window, polyorder))?;

    let mut out = vec![0.0; len];
    let interior = correlate_valid(samples, center.as_slice());
    out[half..len - half].copy_from_slice(&interior);

    let head = fit_polynomial(&design, polyorder, &samples[..window])?;
    let tail = fit_polynomial(&design, polyorder, &samples[len - window..])?;
    for offset in 0..half {
        let u = (half - offset) as f64 / half as f64;
        out[offset] = eval_polynomial(&head, -u);
        out[len - 1 - offset] = eval_polynomial(&tail, u);
    }
    Ok(out)
}

/// `out[m] = sum_j kernel[j] * samples[m + j]` for every full placement of
/// the kernel. Requires `kernel.len() <= samples.len()`.
fn correlate_valid(samples: &[f64], kernel: &[f64]) -> Vec<f64> {
    if kernel.len() <= DIRECT_KERNEL_MAX {
        correlate_direct(samples, kernel)
    } else {
        correlate_fft(samples, kernel)
    }
}

fn correlate_direct(samples: &[f64], kernel: &[f64]) -> Vec<f64> {
    samples
        .windows(kernel.len())
        .map(|span| kernel.iter().zip(span).map(|(k, x)| k * x).sum())
        .collect()
}

fn correlate_fft(samples: &[f64], kernel: &[f64]) -> Vec<f64> {
    let width = kernel.len();
    let count = samples.len() + 1 - width;
    let size = (4 * width).next_power_of_two();
    let step = size - width + 1;

    let mut planner = FftPlanner::<f64>::new();
    let forward = planner.plan_fft_forward(size);
    let inverse = planner.plan_fft_inverse(size);

    // Correlation is convolution with the reversed kernel.
    let mut response = vec![Complex64::new(0.0, 0.0); size];
    for (j, &k) in kernel.iter().enumerate() {
        response[width - 1 - j] = Complex64::new(k, 0.0);
    }
    forward.process(&mut response);

    let scale = 1.0 / size as f64;
    let mut block = vec![Complex64::new(0.0, 0.0); size];
    let mut out = Vec::with_capacity(count);
    let mut start = 0;
    while start < count {
        for (i, slot) in block.iter_mut().enumerate() {
            *slot = Complex64::new(samples.get(start + i).copied().unwrap_or(0.0), 0.0);
        }
        forward.process(&mut block);
        for (b, r) in block.iter_mut().zip(&response) {
            *b *= r;
        }
        inverse.process(&mut block);

        // Outputs before `width - 1` wrap around the block and are discarded.
        let take = step.min(count - start);
        out.extend(block[width - 1..width - 1 + take].iter().map(|c| c.re * scale));
        start += step;
    }
    out
}

/// Centered moving average. Windows are clipped at the edges and divided by
/// the number of samples actually covered.
pub fn moving_average(samples: &[f64], window: usize) -> Vec<f64> {
    let window = window.max(1);
    let len = samples.len();
    let mut prefix = Vec::with_capacity(len + 1);
    prefix.push(0.0);
    for &x in samples {
        let last = prefix[prefix.len() - 1];
        prefix.push(last + x);
    }

    (0..len)
        .map(|i| {
            let lo = i.saturating_sub(window / 2);
            let hi = (i + (window - 1) / 2).min(len - 1);
            (prefix[hi + 1] - prefix[lo]) / (hi + 1 - lo) as f64
        })
        .collect()
}

//! Cleaning quality diagnostics

use eeg_types::{AnalysisError, AnalysisResult, CleanedSignal, QualityMetrics, RawSignal};
use tracing::debug;

use crate::config::ARTIFACT_Z_THRESHOLD;
use crate::stats;

/// Compares a recording with its cleaned version.
///
/// The artifact count is taken from the recording itself and does not
/// depend on what the pipeline clipped.
#[derive(Debug, Clone, Copy)]
pub struct QualityAssessor {
    z_threshold: f64,
}

impl Default for QualityAssessor {
    fn default() -> Self {
        Self { z_threshold: ARTIFACT_Z_THRESHOLD }
    }
}

impl QualityAssessor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn assess(&self, original: &RawSignal, cleaned: &CleanedSignal) -> AnalysisResult<QualityMetrics> {
        if original.len() != cleaned.len() {
            return Err(AnalysisError::degenerate(format!(
                "cleaned signal has {} samples, recording has {}",
                cleaned.len(),
                original.len()
            )));
        }

        let raw = original.samples();
        let clean = cleaned.samples();
        let clean_var = stats::variance(clean);
        if clean_var == 0.0 {
            return Err(AnalysisError::degenerate("cleaned signal has zero variance"));
        }

        let residual: Vec<f64> = raw.iter().zip(clean).map(|(r, c)| r - c).collect();
        let noise_var = stats::variance(&residual);
        let snr_db = if noise_var > 0.0 {
            10.0 * (clean_var / noise_var).log10()
        } else {
            f64::INFINITY
        };

        let artifacts_removed = stats::outlier_mask(raw, self.z_threshold)
            .into_iter()
            .filter(|&flagged| flagged)
            .count();

        let metrics = QualityMetrics {
            snr_db,
            artifacts_removed,
            variance_reduction_ratio: stats::variance(raw) / clean_var,
        };
        debug!("Quality metrics: {:?}", metrics);
        Ok(metrics)
    }
}

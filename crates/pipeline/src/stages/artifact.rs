//! Statistical artifact clipping stage

use eeg_types::AnalysisResult;
use tracing::{debug, info};

use crate::config::ARTIFACT_Z_THRESHOLD;
use crate::stage::{PipelineStage, StageMetric};
use crate::stats;

/// Replaces samples whose |z| exceeds the threshold with the signal median.
///
/// Values are substituted, never removed, so the length is preserved.
#[derive(Debug)]
pub struct ArtifactClipStage {
    threshold: f64,
    samples_clipped: usize,
}

impl ArtifactClipStage {
    pub fn new() -> Self {
        Self {
            threshold: ARTIFACT_Z_THRESHOLD,
            samples_clipped: 0,
        }
    }

    /// Samples replaced during the most recent run.
    pub fn samples_clipped(&self) -> usize {
        self.samples_clipped
    }
}

impl Default for ArtifactClipStage {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStage for ArtifactClipStage {
    fn process(&mut self, mut input: Vec<f64>) -> AnalysisResult<Vec<f64>> {
        info!("Removing artifacts using Z-score method...");
        let mask = stats::outlier_mask(&input, self.threshold);
        let replacement = stats::median(&input);

        let mut clipped = 0;
        for (sample, flagged) in input.iter_mut().zip(mask) {
            if flagged {
                *sample = replacement;
                clipped += 1;
            }
        }
        self.samples_clipped = clipped;
        debug!("Clipped {} samples to median {}", clipped, replacement);
        Ok(input)
    }

    fn stage_type(&self) -> &'static str {
        "artifact_clip"
    }

    fn description(&self) -> &'static str {
        "Replaces z-score outliers with the median"
    }

    fn get_metrics(&self) -> Vec<StageMetric> {
        vec![
            StageMetric::new("samples_clipped", self.samples_clipped as f64, "samples"),
            StageMetric::new("z_threshold", self.threshold, "sigma"),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_spike_is_replaced_by_median() {
        let mut input: Vec<f64> = (0..20).map(|i| if i % 2 == 0 { 1.0 } else { -1.0 }).collect();
        input.insert(10, 50.0);

        let mut stage = ArtifactClipStage::new();
        let out = stage.process(input.clone()).unwrap();

        assert_eq!(out.len(), input.len());
        assert_eq!(out[10], 1.0);
        assert_eq!(stage.samples_clipped(), 1);
        for (i, (a, b)) in input.iter().zip(&out).enumerate() {
            if i != 10 {
                assert_eq!(a, b);
            }
        }
    }

    #[test]
    fn test_no_outliers_is_a_no_op() {
        let input: Vec<f64> = (0..1024).map(|i| (2.0 * PI * 10.0 * i as f64 / 512.0).sin()).collect();
        let mut stage = ArtifactClipStage::new();
        let out = stage.process(input.clone()).unwrap();
        assert_eq!(out, input);
        assert_eq!(stage.samples_clipped(), 0);
    }

    #[test]
    fn test_constant_signal_is_untouched() {
        let mut stage = ArtifactClipStage::new();
        assert_eq!(stage.process(vec![2.0; 8]).unwrap(), vec![2.0; 8]);
        assert_eq!(stage.get_metrics()[0].value, 0.0);
    }
}

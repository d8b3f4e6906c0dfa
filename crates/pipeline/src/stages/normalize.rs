//! Normalization stage

use eeg_types::{AnalysisError, AnalysisResult};
use tracing::info;

use crate::stage::{PipelineStage, StageMetric};
use crate::stats;

/// Divides the signal by its own standard deviation.
#[derive(Debug, Default)]
pub struct NormalizeStage {
    std_before: f64,
}

impl NormalizeStage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PipelineStage for NormalizeStage {
    fn process(&mut self, mut input: Vec<f64>) -> AnalysisResult<Vec<f64>> {
        info!("Normalizing signal...");
        if input.is_empty() {
            self.std_before = 0.0;
            return Ok(input);
        }

        let sigma = stats::std_dev(&input);
        self.std_before = sigma;
        if sigma == 0.0 || !sigma.is_finite() {
            return Err(AnalysisError::degenerate(format!(
                "cannot normalize a signal with standard deviation {}",
                sigma
            )));
        }
        input.iter_mut().for_each(|x| *x /= sigma);
        Ok(input)
    }

    fn stage_type(&self) -> &'static str {
        "normalize"
    }

    fn description(&self) -> &'static str {
        "Scales the signal to unit standard deviation"
    }

    fn get_metrics(&self) -> Vec<StageMetric> {
        vec![StageMetric::new("std_before", self.std_before, "units")]
    }
}

//! DC removal stage

use eeg_types::AnalysisResult;
use tracing::info;

use crate::stage::{PipelineStage, StageMetric};
use crate::stats;

/// Subtracts the whole-signal mean.
#[derive(Debug, Default)]
pub struct DcRemovalStage {
    removed_offset: f64,
}

impl DcRemovalStage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PipelineStage for DcRemovalStage {
    fn process(&mut self, mut input: Vec<f64>) -> AnalysisResult<Vec<f64>> {
        info!("Removing DC component...");
        let offset = stats::mean(&input);
        input.iter_mut().for_each(|x| *x -= offset);
        self.removed_offset = offset;
        Ok(input)
    }

    fn stage_type(&self) -> &'static str {
        "dc_removal"
    }

    fn description(&self) -> &'static str {
        "Subtracts the arithmetic mean of the whole signal"
    }

    fn get_metrics(&self) -> Vec<StageMetric> {
        vec![StageMetric::new("removed_offset", self.removed_offset, "units")]
    }
}

//! The fixed six-stage cleaning pipeline.

use eeg_types::{AnalysisResult, CleanedSignal, RawSignal};
use tracing::{debug, info};

use crate::stage::{PipelineStage, StageMetric};
use crate::stages::{
    ArtifactClipStage, BandpassStage, DcRemovalStage, NormalizeStage, NotchStage, SmoothingStage,
};

/// Runs DC removal, notch, bandpass, artifact clipping, smoothing and
/// normalization in that order over a whole recording.
///
/// Built per analysis for one sampling rate. Filter coefficients are designed
/// up front so an unusable rate fails before any sample is touched.
pub struct FilterPipeline {
    sampling_rate: u32,
    stages: Vec<Box<dyn PipelineStage>>,
}

impl FilterPipeline {
    pub fn new(sampling_rate: u32) -> AnalysisResult<Self> {
        let stages: Vec<Box<dyn PipelineStage>> = vec![
            Box::new(DcRemovalStage::new()),
            Box::new(NotchStage::new(sampling_rate)?),
            Box::new(BandpassStage::new(sampling_rate)?),
            Box::new(ArtifactClipStage::new()),
            Box::new(SmoothingStage::new(sampling_rate)),
            Box::new(NormalizeStage::new()),
        ];
        Ok(Self { sampling_rate, stages })
    }

    pub fn sampling_rate(&self) -> u32 {
        self.sampling_rate
    }

    /// Stage identifiers in execution order.
    pub fn stage_types(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.stage_type()).collect()
    }

    /// Clean `raw`. Output has the same length and rate; any stage error
    /// aborts the run.
    pub fn run(&mut self, raw: &RawSignal) -> AnalysisResult<CleanedSignal> {
        info!(
            "Cleaning {} samples at {} Hz through {} stages",
            raw.len(),
            self.sampling_rate,
            self.stages.len()
        );
        let mut signal = raw.samples().to_vec();
        for stage in self.stages.iter_mut() {
            signal = stage.process(signal)?;
            for metric in stage.get_metrics() {
                debug!("[{}] {} = {} {}", stage.stage_type(), metric.name, metric.value, metric.unit);
            }
        }
        Ok(CleanedSignal::new(signal, self.sampling_rate))
    }

    /// Metrics of every stage from the most recent run.
    pub fn metrics(&self) -> Vec<(&'static str, Vec<StageMetric>)> {
        self.stages
            .iter()
            .map(|s| (s.stage_type(), s.get_metrics()))
            .collect()
    }
}

impl std::fmt::Debug for FilterPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterPipeline")
            .field("sampling_rate", &self.sampling_rate)
            .field("stages", &self.stage_types())
            .finish()
    }
}

//! Powerline notch stage

use eeg_types::AnalysisResult;
use tracing::info;

use crate::config::{NOTCH_FREQUENCIES_HZ, NOTCH_QUALITY_FACTOR};
use crate::filters::{iir_notch, SosFilter};
use crate::stage::{PipelineStage, StageMetric};

/// Removes mains interference with zero-phase notches at 50 Hz and then 60 Hz.
#[derive(Debug, Clone)]
pub struct NotchStage {
    notches: Vec<(f64, SosFilter)>,
}

impl NotchStage {
    /// Design both notches for `sampling_rate`. Fails with `FilterDesign` when
    /// a notch frequency is not below the Nyquist frequency.
    pub fn new(sampling_rate: u32) -> AnalysisResult<Self> {
        let notches = NOTCH_FREQUENCIES_HZ
            .iter()
            .map(|&freq| Ok((freq, iir_notch(sampling_rate as f64, freq, NOTCH_QUALITY_FACTOR)?)))
            .collect::<AnalysisResult<Vec<_>>>()?;
        Ok(Self { notches })
    }
}

impl PipelineStage for NotchStage {
    fn process(&mut self, input: Vec<f64>) -> AnalysisResult<Vec<f64>> {
        info!("Removing power line noise (50Hz, 60Hz)...");
        Ok(self
            .notches
            .iter()
            .fold(input, |signal, (_, filter)| filter.filtfilt(&signal)))
    }

    fn stage_type(&self) -> &'static str {
        "notch"
    }

    fn description(&self) -> &'static str {
        "Zero-phase IIR notches at the mains frequencies"
    }

    fn get_metrics(&self) -> Vec<StageMetric> {
        self.notches
            .iter()
            .map(|(freq, _)| StageMetric::new("notch_frequency", *freq, "Hz"))
            .collect()
    }
}

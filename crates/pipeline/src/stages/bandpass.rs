//! Bandpass stage

use eeg_types::AnalysisResult;
use tracing::info;

use crate::config::{BANDPASS_HIGH_HZ, BANDPASS_LOW_HZ, BANDPASS_ORDER};
use crate::filters::{butterworth_bandpass, SosFilter};
use crate::stage::{PipelineStage, StageMetric};

/// Zero-phase Butterworth bandpass over the EEG range.
#[derive(Debug, Clone)]
pub struct BandpassStage {
    low_hz: f64,
    high_hz: f64,
    filter: SosFilter,
}

impl BandpassStage {
    pub fn new(sampling_rate: u32) -> AnalysisResult<Self> {
        Self::with_band(sampling_rate, BANDPASS_LOW_HZ, BANDPASS_HIGH_HZ)
    }

    /// Fails with `FilterDesign` unless `0 < low < high < sampling_rate / 2`.
    pub fn with_band(sampling_rate: u32, low_hz: f64, high_hz: f64) -> AnalysisResult<Self> {
        let filter = butterworth_bandpass(sampling_rate as f64, low_hz, high_hz, BANDPASS_ORDER)?;
        Ok(Self { low_hz, high_hz, filter })
    }
}

impl PipelineStage for BandpassStage {
    fn process(&mut self, input: Vec<f64>) -> AnalysisResult<Vec<f64>> {
        info!("Applying bandpass filter ({}-{}Hz)...", self.low_hz, self.high_hz);
        Ok(self.filter.filtfilt(&input))
    }

    fn stage_type(&self) -> &'static str {
        "bandpass"
    }

    fn description(&self) -> &'static str {
        "Zero-phase Butterworth bandpass"
    }

    fn get_metrics(&self) -> Vec<StageMetric> {
        vec![
            StageMetric::new("low_cutoff", self.low_hz, "Hz"),
            StageMetric::new("high_cutoff", self.high_hz, "Hz"),
            StageMetric::new("order", self.filter.order() as f64, "poles"),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eeg_types::AnalysisError;
    use proptest::prelude::*;
    use std::f64::consts::PI;

    fn rms(x: &[f64]) -> f64 {
        (x.iter().map(|v| v * v).sum::<f64>() / x.len() as f64).sqrt()
    }

    #[test]
    fn test_design_succeeds_only_below_nyquist() {
        for rate in [1u32, 100, 199, 200] {
            let err = BandpassStage::new(rate).unwrap_err();
            assert!(matches!(err, AnalysisError::FilterDesign { .. }), "rate {rate}");
        }
        for rate in [201u32, 256, 512, 1000] {
            assert!(BandpassStage::new(rate).is_ok(), "rate {rate}");
        }
    }

    #[test]
    fn test_passband_and_stopband() {
        let rate = 512.0;
        let len = 10 * 512;
        let mut stage = BandpassStage::new(512).unwrap();

        let alpha: Vec<f64> = (0..len).map(|i| (2.0 * PI * 10.0 * i as f64 / rate).sin()).collect();
        let out = stage.process(alpha.clone()).unwrap();
        let mid = len / 4..3 * len / 4;
        let ratio = rms(&out[mid.clone()]) / rms(&alpha[mid.clone()]);
        assert!((ratio - 1.0).abs() < 0.05, "passband ratio {ratio}");

        // First differences drop the slow edge tail of the 0.1 Hz section.
        let diff = |x: &[f64]| x.windows(2).map(|w| w[1] - w[0]).collect::<Vec<f64>>();
        let high: Vec<f64> = (0..len).map(|i| (2.0 * PI * 200.0 * i as f64 / rate).sin()).collect();
        let out = stage.process(high.clone()).unwrap();
        let ratio = rms(&diff(&out[mid.clone()])) / rms(&diff(&high[mid]));
        assert!(ratio < 0.01, "stopband ratio {ratio}");
    }

    #[test]
    fn test_removes_constant_offset() {
        let mut stage = BandpassStage::new(512).unwrap();
        let out = stage.process(vec![5.0; 2048]).unwrap();
        assert!(out.iter().all(|v| v.abs() < 1e-6));
    }

    #[test]
    fn test_eeg_band_has_no_phase_lag() {
        let rate = 512.0;
        let len = 20 * 512;
        let x: Vec<f64> = (0..len)
            .map(|i| {
                let t = i as f64 / rate;
                (2.0 * PI * 5.0 * t).sin()
                    + 0.5 * (2.0 * PI * 10.0 * t + 1.0).sin()
                    + 0.25 * (2.0 * PI * 25.0 * t + 2.0).sin()
            })
            .collect();
        let out = BandpassStage::new(512).unwrap().process(x.clone()).unwrap();

        // First differences drop the slow edge tail of the 0.1 Hz section.
        // A one-sample lag would leave differences near 0.03 here.
        let diff = |x: &[f64]| x.windows(2).map(|w| w[1] - w[0]).collect::<Vec<f64>>();
        let (dx, dy) = (diff(&x), diff(&out));
        let mid = len / 4..3 * len / 4;
        for i in mid.clone() {
            assert!((dy[i] - dx[i]).abs() < 5e-3, "sample {i}: {} vs {}", dy[i], dx[i]);
        }

        // Zero phase: the cross-correlation peaks at lag 0 and is symmetric.
        let xcorr = |lag: isize| -> f64 {
            mid.clone().map(|i| dy[i] * dx[(i as isize + lag) as usize]).sum()
        };
        let (before, at, after) = (xcorr(-1), xcorr(0), xcorr(1));
        assert!(at > before && at > after);
        assert!((after - before).abs() / at < 1e-4, "{before} vs {after}");
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn prop_zero_phase_time_reversal(
            x in prop::collection::vec(-1.0f64..1.0, 4000),
        ) {
            // Short band edges keep the impulse response well inside the window.
            let mut stage = BandpassStage::with_band(512, 20.0, 60.0).unwrap();
            let forward = stage.process(x.clone()).unwrap();

            let mut reversed = x;
            reversed.reverse();
            let mut backward = stage.process(reversed).unwrap();
            backward.reverse();

            for i in 1500..2500 {
                prop_assert!((forward[i] - backward[i]).abs() < 1e-6);
            }
        }
    }
}

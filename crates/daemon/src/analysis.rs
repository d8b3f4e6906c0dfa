//! End-to-end analysis of one recording.

use brain_waves_fft::SpectralAnalyzer;
use eeg_types::{
    AnalysisError, AnalysisResult, BandPowerResult, Header, QualityMetrics, RawSignal,
};
use pipeline::{FilterPipeline, HeaderParser, QualityAssessor, SampleLoader};
use serde::Serialize;
use tracing::{info, warn};

use crate::config::DaemonConfig;

/// Everything one analysis produces.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub sampling_rate: u32,
    pub band_powers: BandPowerResult,
    pub dominant_band: &'static str,
    pub quality: QualityMetrics,
}

/// Runs header parsing, decoding, cleaning, band analysis and quality scoring.
///
/// Holds no per-recording state; every call builds its own pipeline.
#[derive(Debug, Clone)]
pub struct EegAnalyzer {
    header_parser: HeaderParser,
    loader: SampleLoader,
}

impl EegAnalyzer {
    pub fn new(default_sampling_rate: u32) -> Self {
        Self {
            header_parser: HeaderParser::new(default_sampling_rate),
            loader: SampleLoader::new(),
        }
    }

    pub fn from_config(config: &DaemonConfig) -> Self {
        Self {
            header_parser: HeaderParser::new(config.default_sampling_rate),
            loader: SampleLoader::with_max_bytes(config.max_upload_bytes),
        }
    }

    pub fn loader(&self) -> &SampleLoader {
        &self.loader
    }

    /// Header for `text`. A malformed sampling interval keeps the default rate.
    pub fn header(&self, text: &str) -> AnalysisResult<Header> {
        match self.header_parser.parse(text) {
            Ok(header) => Ok(header),
            Err(e) if e.is_recoverable() => {
                let header = self.header_parser.default_header();
                warn!("{}; using default sampling rate {} Hz", e, header.sampling_rate);
                Ok(header)
            }
            Err(e) => Err(e),
        }
    }

    pub fn analyze(&self, raw_eeg_bytes: &[u8], header_text: &str) -> AnalysisResult<AnalysisReport> {
        let header = self.header(header_text)?;
        let samples = self.loader.decode(raw_eeg_bytes)?;
        self.analyze_samples(samples, header)
    }

    /// Analyze samples that were already decoded.
    pub fn analyze_samples(&self, samples: Vec<f64>, header: Header) -> AnalysisResult<AnalysisReport> {
        let raw = RawSignal::new(samples, header.sampling_rate);
        info!(
            "Loaded {} samples at {} Hz ({:.2} s)",
            raw.len(),
            raw.sampling_rate(),
            raw.duration_secs()
        );

        let mut pipeline = FilterPipeline::new(header.sampling_rate)?;
        let cleaned = pipeline.run(&raw)?;

        let band_powers = SpectralAnalyzer::new(header.sampling_rate).band_powers(&cleaned)?;
        let dominant_band = band_powers.dominant_band().ok_or(AnalysisError::EmptySpectrum)?;

        let quality = QualityAssessor::new().assess(&raw, &cleaned)?;
        info!("Analysis complete: dominant band {}", dominant_band);

        Ok(AnalysisReport {
            sampling_rate: header.sampling_rate,
            band_powers,
            dominant_band,
            quality,
        })
    }
}

/// Analyze a raw little-endian 16-bit sample stream with its header text.
pub fn analyze(
    raw_eeg_bytes: &[u8],
    header_text: &str,
    default_sampling_rate: u32,
) -> AnalysisResult<AnalysisReport> {
    EegAnalyzer::new(default_sampling_rate).analyze(raw_eeg_bytes, header_text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_interval_keeps_default() {
        let analyzer = EegAnalyzer::new(512);
        let header = analyzer.header("SamplingInterval=abc\n").unwrap();
        assert_eq!(header.sampling_rate, 512);
    }

    #[test]
    fn test_interval_sets_rate() {
        let analyzer = EegAnalyzer::new(512);
        assert_eq!(analyzer.header("SamplingInterval=2000").unwrap().sampling_rate, 500);
    }

    #[test]
    fn test_single_byte_is_empty_spectrum() {
        assert_eq!(analyze(&[7], "", 512).unwrap_err(), AnalysisError::EmptySpectrum);
    }

    #[test]
    fn test_low_default_rate_fails_design() {
        let bytes: Vec<u8> = (0..400i16).flat_map(|v| v.to_le_bytes()).collect();
        let err = analyze(&bytes, "", 100).unwrap_err();
        assert!(matches!(err, AnalysisError::FilterDesign { .. }));
    }
}

//! Upload handling and the response envelope returned to clients.

use eeg_types::{AnalysisError, BandPowerResult, QualityMetrics};
use serde::Serialize;
use tracing::{error, info, warn};

use crate::analysis::{AnalysisReport, EegAnalyzer};
use crate::config::DaemonConfig;
use crate::render::{artwork_filename, BandPowerRenderer, CaptionRenderer};
use crate::staging::{sanitize_filename, StagedRecording, UploadedFile};

pub const MSG_NO_FILES: &str = "No files were selected.";
pub const MSG_MISSING_HEADER: &str =
    "A matching header file (.vhdr) is required. Please select both files.";
pub const MSG_MISSING_DATA: &str =
    "A matching data file (.eeg) is required. Please select both files.";
pub const MSG_UNSUPPORTED: &str =
    "Unsupported file format. Please select a .eeg and a .vhdr file.";
pub const MSG_LOAD_FAILED: &str = "Failed to load the EEG data. Please check the file format.";
pub const MSG_NOISE_REMOVAL_FAILED: &str = "Noise removal failed.";
pub const MSG_FREQUENCY_ANALYSIS_FAILED: &str = "Frequency analysis failed.";
pub const MSG_INTERNAL: &str = "An internal error occurred while processing the upload.";

/// Quality block of a successful response, rounded for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignalQuality {
    /// `None` when the cleaning removed nothing measurable
    pub snr_improvement_db: Option<f64>,
    pub artifacts_removed: usize,
    pub noise_reduction_ratio: Option<f64>,
}

impl From<&QualityMetrics> for SignalQuality {
    fn from(metrics: &QualityMetrics) -> Self {
        Self {
            snr_improvement_db: round2(metrics.snr_db),
            artifacts_removed: metrics.artifacts_removed,
            noise_reduction_ratio: round2(metrics.variance_reduction_ratio),
        }
    }
}

/// JSON envelope for one upload. Failures carry only `success` and `error`.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct AnalyzeResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dominant_band: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub band_powers: Option<BandPowerResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signal_quality: Option<SignalQuality>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
}

impl AnalyzeResponse {
    pub fn failure(message: &str) -> Self {
        Self {
            success: false,
            error: Some(message.to_string()),
            ..Self::default()
        }
    }
}

fn round2(value: f64) -> Option<f64> {
    value.is_finite().then(|| (value * 100.0).round() / 100.0)
}

/// Fixed client-facing message for an analysis failure.
pub fn failure_message(err: &AnalysisError) -> &'static str {
    match err {
        AnalysisError::HeaderParse { .. } | AnalysisError::Decode { .. } => MSG_LOAD_FAILED,
        AnalysisError::FilterDesign { .. } | AnalysisError::DegenerateSignal { .. } => {
            MSG_NOISE_REMOVAL_FAILED
        }
        AnalysisError::EmptySpectrum => MSG_FREQUENCY_ANALYSIS_FAILED,
    }
}

/// Split an upload into its data and header files. The last file with
/// each extension wins; files without a name are skipped.
pub fn pair_uploads(files: &[UploadedFile]) -> Result<(&UploadedFile, &UploadedFile), &'static str> {
    if files.is_empty() {
        return Err(MSG_NO_FILES);
    }

    let mut eeg = None;
    let mut vhdr = None;
    for file in files.iter().filter(|f| !f.filename.is_empty()) {
        if file.has_extension(".eeg") {
            eeg = Some(file);
        } else if file.has_extension(".vhdr") {
            vhdr = Some(file);
        }
    }

    match (eeg, vhdr) {
        (Some(eeg), Some(vhdr)) => Ok((eeg, vhdr)),
        (Some(_), None) => Err(MSG_MISSING_HEADER),
        (None, Some(_)) => Err(MSG_MISSING_DATA),
        (None, None) => Err(MSG_UNSUPPORTED),
    }
}

/// Handle one analysis upload end to end. Never fails: every error becomes
/// a `success: false` response with a fixed message, and staged files are
/// removed before returning.
pub fn handle_analyze(
    config: &DaemonConfig,
    files: &[UploadedFile],
    subject_label: Option<&str>,
) -> AnalyzeResponse {
    handle_analyze_with(config, files, subject_label, &CaptionRenderer)
}

pub fn handle_analyze_with(
    config: &DaemonConfig,
    files: &[UploadedFile],
    subject_label: Option<&str>,
    renderer: &dyn BandPowerRenderer,
) -> AnalyzeResponse {
    let (eeg_file, vhdr_file) = match pair_uploads(files) {
        Ok(pair) => pair,
        Err(message) => {
            warn!("Rejected upload: {}", message);
            return AnalyzeResponse::failure(message);
        }
    };

    let eeg_name = sanitize_filename(&eeg_file.filename, "upload.eeg");
    let vhdr_name = sanitize_filename(&vhdr_file.filename, "upload.vhdr");
    for (name, file) in [(&eeg_name, eeg_file), (&vhdr_name, vhdr_file)] {
        if file.bytes.len() > config.max_upload_bytes {
            warn!(
                "Rejected upload {}: {} bytes exceeds the {}-byte limit",
                name,
                file.bytes.len(),
                config.max_upload_bytes
            );
            return AnalyzeResponse::failure(MSG_LOAD_FAILED);
        }
    }
    info!("Analyzing upload {} with header {}", eeg_name, vhdr_name);

    let staged = match StagedRecording::stage(
        config.staging_dir.as_deref(),
        &eeg_name,
        &eeg_file.bytes,
        &vhdr_name,
        &vhdr_file.bytes,
    ) {
        Ok(staged) => staged,
        Err(e) => {
            error!("Staging failed: {:#}", e);
            return AnalyzeResponse::failure(MSG_INTERNAL);
        }
    };

    let result = analyze_staged(config, &staged);
    staged.close();

    let report = match result {
        Ok(report) => report,
        Err(e) => {
            error!("Analysis of {} failed: {}", eeg_name, e);
            return AnalyzeResponse::failure(failure_message(&e));
        }
    };

    let label = subject_label.unwrap_or(&config.subject_label).to_string();
    let caption = match renderer.render(&report.band_powers, &label) {
        Ok(caption) => Some(caption),
        Err(e) => {
            error!("Renderer '{}' failed: {:#}", renderer.name(), e);
            None
        }
    };

    AnalyzeResponse {
        success: true,
        error: None,
        dominant_band: Some(report.dominant_band),
        signal_quality: Some(SignalQuality::from(&report.quality)),
        band_powers: Some(report.band_powers),
        subject_label: Some(label),
        caption,
        filename: Some(artwork_filename(&eeg_name)),
    }
}

fn analyze_staged(config: &DaemonConfig, staged: &StagedRecording) -> Result<AnalysisReport, AnalysisError> {
    let analyzer = EegAnalyzer::from_config(config);
    let header_text = staged
        .read_header()
        .map_err(|e| AnalysisError::decode(format!("could not read staged header: {e}")))?;
    let header = analyzer.header(&header_text)?;

    let eeg = staged
        .open_eeg()
        .map_err(|e| AnalysisError::decode(format!("could not open staged data: {e}")))?;
    let samples = analyzer.loader().read_from(eeg)?;
    analyzer.analyze_samples(samples, header)
}

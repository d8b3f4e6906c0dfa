//! Error types for the analysis system

use serde::{Deserialize, Serialize};

/// Represents errors that can occur while analyzing a recording.
///
/// Every analysis either completes or fails with exactly one of these kinds.
/// Only `HeaderParse` is recoverable: the caller keeps its default sampling rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
pub enum AnalysisError {
    /// The header contained a sampling interval that could not be interpreted.
    #[error("Header parse error: {message}")]
    HeaderParse { message: String },

    /// The binary sample stream could not be decoded.
    #[error("Decode error: {message}")]
    Decode { message: String },

    /// Filter coefficients could not be designed for the requested bounds.
    #[error("Filter design error: {message}")]
    FilterDesign { message: String },

    /// The signal has zero variance where a nonzero one is required.
    #[error("Degenerate signal: {message}")]
    DegenerateSignal { message: String },

    /// Spectral analysis was requested on an empty signal.
    #[error("Empty spectrum: no samples to analyze")]
    EmptySpectrum,
}

impl AnalysisError {
    pub fn header_parse(message: impl Into<String>) -> Self {
        AnalysisError::HeaderParse { message: message.into() }
    }

    pub fn decode(message: impl Into<String>) -> Self {
        AnalysisError::Decode { message: message.into() }
    }

    pub fn filter_design(message: impl Into<String>) -> Self {
        AnalysisError::FilterDesign { message: message.into() }
    }

    pub fn degenerate(message: impl Into<String>) -> Self {
        AnalysisError::DegenerateSignal { message: message.into() }
    }

    /// Whether the caller may continue after this error.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, AnalysisError::HeaderParse { .. })
    }
}

/// Result type for analysis operations
pub type AnalysisResult<T> = Result<T, AnalysisError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_header_errors_are_recoverable() {
        assert!(AnalysisError::header_parse("bad interval").is_recoverable());
        assert!(!AnalysisError::decode("truncated").is_recoverable());
        assert!(!AnalysisError::filter_design("high >= nyquist").is_recoverable());
        assert!(!AnalysisError::degenerate("zero std").is_recoverable());
        assert!(!AnalysisError::EmptySpectrum.is_recoverable());
    }

    #[test]
    fn test_error_display() {
        let err = AnalysisError::filter_design("low must be positive");
        assert_eq!(err.to_string(), "Filter design error: low must be positive");
    }
}

//! Core pipeline stage trait and types

use eeg_types::AnalysisResult;
use serde::{Deserialize, Serialize};

/// Core trait that all pipeline stages must implement.
///
/// A stage consumes the complete output of the previous stage and returns a
/// signal of the same length.
pub trait PipelineStage: Send {
    /// Process the whole signal and produce the next one
    fn process(&mut self, input: Vec<f64>) -> AnalysisResult<Vec<f64>>;

    /// Get the unique name/identifier for this stage type
    fn stage_type(&self) -> &'static str;

    /// Get a human-readable description of what this stage does
    fn description(&self) -> &'static str {
        "Pipeline stage"
    }

    /// Get stage-specific metrics from the most recent run
    fn get_metrics(&self) -> Vec<StageMetric> {
        vec![]
    }
}

/// Stage metrics for diagnostics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageMetric {
    /// Metric name
    pub name: String,
    /// Metric value
    pub value: f64,
    /// Metric unit (e.g., "samples", "Hz")
    pub unit: String,
    /// Optional description
    pub description: Option<String>,
}

impl StageMetric {
    /// Create a new stage metric
    pub fn new(name: impl Into<String>, value: f64, unit: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value,
            unit: unit.into(),
            description: None,
        }
    }

    /// Create a new stage metric with description
    pub fn with_description(
        name: impl Into<String>,
        value: f64,
        unit: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            description: Some(description.into()),
            ..Self::new(name, value, unit)
        }
    }
}

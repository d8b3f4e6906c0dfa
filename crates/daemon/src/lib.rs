//! Brain wave analysis service: turns an uploaded BrainVision recording
//! into band powers, a dominant band and cleaning diagnostics.

pub mod analysis;
pub mod api;
pub mod config;
pub mod render;
pub mod staging;

pub use analysis::{analyze, AnalysisReport, EegAnalyzer};
pub use api::{handle_analyze, AnalyzeResponse};
pub use config::{load_config, DaemonConfig};
pub use staging::UploadedFile;

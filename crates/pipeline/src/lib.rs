//! Noise-removal pipeline for single-channel EEG recordings.
//!
//! Loads a recording from its header and binary sample stream, cleans it
//! through a fixed sequence of stages and scores the cleaning against the
//! original.

pub mod config;
pub mod filters;
pub mod source;
pub mod stage;
pub mod stages;
pub mod stats;
pub mod pipeline;
pub mod quality;


// Re-export commonly used types
pub use config::*;
pub use pipeline::FilterPipeline;
pub use quality::QualityAssessor;
pub use source::{HeaderParser, SampleLoader};
pub use stage::*;
pub use stages::*;

//! Shared types for the EEG analysis system
//!
//! This crate contains the data model used throughout the analysis workspace:
//! recorded and cleaned signals, the fixed physiological frequency bands,
//! per-band results, signal quality metrics and the error type every
//! analysis step reports.

pub mod band;
pub mod data;
pub mod error;

// Re-export commonly used types
pub use band::*;
pub use data::*;
pub use error::*;

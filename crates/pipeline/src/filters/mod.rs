//! IIR filter design and zero-phase application

pub mod design;
pub mod sos;

pub use design::{butterworth_bandpass, iir_notch, normalized_band};
pub use sos::{FilterCoefficients, SosFilter};

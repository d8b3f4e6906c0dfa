//! Fixed constants of the noise-removal pipeline. None of them is
//! user-configurable.

/// Mains interference frequencies removed by the notch stage, applied in order.
pub const NOTCH_FREQUENCIES_HZ: [f64; 2] = [50.0, 60.0];

/// Quality factor of each notch filter.
pub const NOTCH_QUALITY_FACTOR: f64 = 30.0;

/// Lower edge of the bandpass stage.
pub const BANDPASS_LOW_HZ: f64 = 0.1;

/// Upper edge of the bandpass stage.
pub const BANDPASS_HIGH_HZ: f64 = 100.0;

/// Butterworth prototype order of the bandpass stage.
pub const BANDPASS_ORDER: usize = 4;

/// Samples with |z| above this are treated as artifacts.
pub const ARTIFACT_Z_THRESHOLD: f64 = 3.5;

/// Smoothing window as a fraction of the sampling rate (10 ms).
pub const SMOOTHING_WINDOW_FRACTION: f64 = 0.01;

/// Smallest smoothing window, in samples.
pub const SMOOTHING_MIN_WINDOW: usize = 5;

/// Polynomial order of the Savitzky-Golay smoother.
pub const SMOOTHING_POLYORDER: usize = 3;

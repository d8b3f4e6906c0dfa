//! Filter coefficient design.
//!
//! Frequencies are normalized by the Nyquist frequency before design, so a
//! normalized frequency of 1.0 is half the sampling rate.

use std::f64::consts::PI;

use eeg_types::{AnalysisError, AnalysisResult};
use num_complex::Complex64;

use super::sos::{FilterCoefficients, SosFilter};

// Sampling rate of the normalized frequency axis, and twice it for the bilinear map.
const NORMALIZED_FS: f64 = 2.0;
const BILINEAR_K: f64 = 2.0 * NORMALIZED_FS;

/// Normalize a band against the Nyquist frequency of `sampling_rate`.
///
/// Fails unless `0 < low < high < nyquist`.
pub fn normalized_band(sampling_rate: f64, low_hz: f64, high_hz: f64) -> AnalysisResult<(f64, f64)> {
    let nyquist = sampling_rate / 2.0;
    if !(nyquist > 0.0 && nyquist.is_finite()) {
        return Err(AnalysisError::filter_design(format!(
            "sampling rate must be positive, got {sampling_rate} Hz"
        )));
    }
    if !(low_hz > 0.0 && low_hz < high_hz && high_hz < nyquist) {
        return Err(AnalysisError::filter_design(format!(
            "band {low_hz}-{high_hz} Hz must satisfy 0 < low < high < {nyquist} Hz (Nyquist)"
        )));
    }
    Ok((low_hz / nyquist, high_hz / nyquist))
}

/// Second-order IIR notch at `freq_hz` with quality factor `q`.
///
/// The -3 dB bandwidth is `freq_hz / q`.
pub fn iir_notch(sampling_rate: f64, freq_hz: f64, q: f64) -> AnalysisResult<SosFilter> {
    let nyquist = sampling_rate / 2.0;
    if !(nyquist > 0.0 && nyquist.is_finite()) {
        return Err(AnalysisError::filter_design(format!(
            "sampling rate must be positive, got {sampling_rate} Hz"
        )));
    }
    let w0 = freq_hz / nyquist;
    if !(w0 > 0.0 && w0 < 1.0) {
        return Err(AnalysisError::filter_design(format!(
            "notch at {freq_hz} Hz must lie strictly between 0 and {nyquist} Hz (Nyquist)"
        )));
    }
    if !(q > 0.0 && q.is_finite()) {
        return Err(AnalysisError::filter_design(format!("quality factor must be positive, got {q}")));
    }

    let bandwidth = w0 / q * PI;
    let w0 = w0 * PI;
    let beta = (bandwidth / 2.0).tan();
    let gain = 1.0 / (1.0 + beta);
    let cos_w0 = w0.cos();

    Ok(SosFilter::new(vec![FilterCoefficients {
        b0: gain,
        b1: -2.0 * gain * cos_w0,
        b2: gain,
        a1: -2.0 * gain * cos_w0,
        a2: 2.0 * gain - 1.0,
    }]))
}

/// Butterworth bandpass built from an analog prototype of the given `order`.
///
/// The result has `order` second-order sections (transfer-function order
/// `2 * order`). Band edges are pre-warped, the lowpass prototype is shifted
/// to a bandpass, and poles are mapped with the bilinear transform. Each
/// section carries one zero at z = 1 and one at z = -1.
pub fn butterworth_bandpass(
    sampling_rate: f64,
    low_hz: f64,
    high_hz: f64,
    order: usize,
) -> AnalysisResult<SosFilter> {
    if order == 0 {
        return Err(AnalysisError::filter_design("filter order must be at least 1"));
    }
    let (low, high) = normalized_band(sampling_rate, low_hz, high_hz)?;

    let warped_low = 2.0 * NORMALIZED_FS * (PI * low / NORMALIZED_FS).tan();
    let warped_high = 2.0 * NORMALIZED_FS * (PI * high / NORMALIZED_FS).tan();
    let bandwidth = warped_high - warped_low;
    let center_sq = warped_low * warped_high;

    let n = order as f64;
    let mut analog_poles = Vec::with_capacity(2 * order);
    for k in 0..order {
        let theta = PI * (2.0 * k as f64 - n + 1.0) / (2.0 * n);
        let prototype = -Complex64::from_polar(1.0, theta);
        let shifted = prototype * (bandwidth / 2.0);
        let offset = (shifted * shifted - center_sq).sqrt();
        analog_poles.push(shifted + offset);
        analog_poles.push(shifted - offset);
    }

    // Analog gain is bandwidth^order with `order` zeros at s = 0.
    let k = Complex64::new(BILINEAR_K, 0.0);
    let den = analog_poles.iter().fold(Complex64::new(1.0, 0.0), |acc, &p| acc * (k - p));
    let gain = bandwidth.powi(order as i32) * (BILINEAR_K.powi(order as i32) / den).re;

    let digital_poles: Vec<Complex64> = analog_poles.iter().map(|&p| (k + p) / (k - p)).collect();
    let mut sections = pair_poles(&digital_poles, order)?;

    if let Some(first) = sections.first_mut() {
        first.b0 *= gain;
        first.b1 *= gain;
        first.b2 *= gain;
    }
    Ok(SosFilter::new(sections))
}

/// Group conjugate pole pairs (and any real poles, two at a time) into
/// sections with numerator `1 - z^-2`.
fn pair_poles(poles: &[Complex64], expected: usize) -> AnalysisResult<Vec<FilterCoefficients>> {
    const IMAG_TOL: f64 = 1e-12;

    let mut sections = Vec::with_capacity(expected);
    let mut real_poles = Vec::new();
    for p in poles {
        if p.im > IMAG_TOL {
            sections.push(section_from(-2.0 * p.re, p.norm_sqr()));
        } else if p.im.abs() <= IMAG_TOL {
            real_poles.push(p.re);
        }
    }
    for pair in real_poles.chunks(2) {
        match pair {
            [r1, r2] => sections.push(section_from(-(r1 + r2), r1 * r2)),
            _ => {
                return Err(AnalysisError::filter_design("unpaired real pole in bandpass design"));
            }
        }
    }

    if sections.len() != expected {
        return Err(AnalysisError::filter_design(format!(
            "expected {expected} second-order sections, got {}",
            sections.len()
        )));
    }
    Ok(sections)
}

fn section_from(a1: f64, a2: f64) -> FilterCoefficients {
    FilterCoefficients { b0: 1.0, b1: 0.0, b2: -1.0, a1, a2 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_complex::Complex64;

    /// |H(e^{jw})| of a cascade at `freq_hz`.
    fn magnitude(filter: &SosFilter, sampling_rate: f64, freq_hz: f64) -> f64 {
        let w = 2.0 * PI * freq_hz / sampling_rate;
        let z1 = Complex64::from_polar(1.0, -w);
        let z2 = z1 * z1;
        filter
            .sections()
            .iter()
            .map(|s| {
                let num = s.b0 + z1 * s.b1 + z2 * s.b2;
                let den = 1.0 + z1 * s.a1 + z2 * s.a2;
                (num / den).norm()
            })
            .product()
    }

    #[test]
    fn test_band_validation() {
        assert!(normalized_band(512.0, 0.1, 100.0).is_ok());
        assert!(normalized_band(512.0, 0.0, 100.0).is_err());
        assert!(normalized_band(512.0, 50.0, 40.0).is_err());
        assert!(normalized_band(512.0, 0.1, 256.0).is_err());
        assert!(normalized_band(0.0, 0.1, 100.0).is_err());
        assert!(normalized_band(200.0, 0.1, 100.0).is_err());
        assert!(normalized_band(201.0, 0.1, 100.0).is_ok());
    }

    #[test]
    fn test_bandpass_error_kind() {
        let err = butterworth_bandpass(150.0, 0.1, 100.0, 4).unwrap_err();
        assert!(matches!(err, AnalysisError::FilterDesign { .. }));
    }

    #[test]
    fn test_bandpass_response() {
        let filter = butterworth_bandpass(512.0, 0.1, 100.0, 4).unwrap();
        assert_eq!(filter.sections().len(), 4);
        assert_eq!(filter.order(), 8);

        // Passband is flat, the edges sit at -3 dB, stopbands are attenuated.
        assert!((magnitude(&filter, 512.0, 10.0) - 1.0).abs() < 1e-3);
        assert!((magnitude(&filter, 512.0, 100.0) - std::f64::consts::FRAC_1_SQRT_2).abs() < 1e-3);
        assert!((magnitude(&filter, 512.0, 0.1) - std::f64::consts::FRAC_1_SQRT_2).abs() < 1e-3);
        assert!(magnitude(&filter, 512.0, 200.0) < 0.05);
        assert!(magnitude(&filter, 512.0, 0.01) < 1e-3);
    }

    #[test]
    fn test_bandpass_is_stable() {
        for rate in [250.0, 512.0, 1000.0, 5000.0] {
            let filter = butterworth_bandpass(rate, 0.1, 100.0, 4).unwrap();
            for s in filter.sections() {
                // Both roots of z^2 + a1 z + a2 inside the unit circle.
                assert!(s.a2.abs() < 1.0, "a2 = {}", s.a2);
                assert!(s.a1.abs() < 1.0 + s.a2, "a1 = {}, a2 = {}", s.a1, s.a2);
            }
        }
    }

    #[test]
    fn test_odd_order_bandpass() {
        let filter = butterworth_bandpass(512.0, 5.0, 40.0, 3).unwrap();
        assert_eq!(filter.sections().len(), 3);
        assert!((magnitude(&filter, 512.0, 14.0) - 1.0).abs() < 1e-2);
    }

    #[test]
    fn test_notch_response() {
        let filter = iir_notch(512.0, 50.0, 30.0).unwrap();
        assert!(magnitude(&filter, 512.0, 50.0) < 1e-9);
        assert!((magnitude(&filter, 512.0, 10.0) - 1.0).abs() < 1e-2);
        assert!((magnitude(&filter, 512.0, 0.0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_notch_above_nyquist_fails() {
        assert!(matches!(iir_notch(100.0, 60.0, 30.0), Err(AnalysisError::FilterDesign { .. })));
        assert!(iir_notch(512.0, 50.0, 0.0).is_err());
    }
}

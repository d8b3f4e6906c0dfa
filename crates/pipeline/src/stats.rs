//! Whole-signal statistics shared by the stages and the quality assessor.
//!
//! Variances are population variances (divide by `n`). Empty inputs yield 0.

pub fn mean(samples: &[f64]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    samples.iter().sum::<f64>() / samples.len() as f64
}

pub fn variance(samples: &[f64]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    let m = mean(samples);
    samples.iter().map(|&x| (x - m) * (x - m)).sum::<f64>() / samples.len() as f64
}

pub fn std_dev(samples: &[f64]) -> f64 {
    variance(samples).sqrt()
}

/// Median; the mean of the two middle values for even lengths.
pub fn median(samples: &[f64]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    let mut sorted = samples.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Flags samples whose z-score, against the whole signal's mean and standard
/// deviation, exceeds `threshold` in magnitude. Nothing is flagged when the
/// standard deviation is zero.
pub fn outlier_mask(samples: &[f64], threshold: f64) -> Vec<bool> {
    let sigma = std_dev(samples);
    if sigma == 0.0 || !sigma.is_finite() {
        return vec![false; samples.len()];
    }
    let m = mean(samples);
    samples
        .iter()
        .map(|&x| ((x - m) / sigma).abs() > threshold)
        .collect()
}

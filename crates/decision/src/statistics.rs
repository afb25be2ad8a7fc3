//! Descriptive statistics primitives
//!
//! Population moments over a slice of observations. Everything here is total
//! for finite input: degenerate cases return `0.0` rather than NaN or infinity.

use crate::errors::{DecisionError, Result};

/// Arithmetic mean
pub fn mean(values: &[f64]) -> Result<f64> {
    if values.is_empty() {
        return Err(DecisionError::EmptyInput(
            "Cannot compute mean of an empty slice".to_string(),
        ));
    }

    Ok(values.iter().sum::<f64>() / values.len() as f64)
}

/// Population variance (divides by N); `0.0` for fewer than two values
pub fn variance(values: &[f64], mean: f64) -> f64 {
    if values.len() <= 1 {
        return 0.0;
    }

    values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64
}

/// Population standard deviation
pub fn std_dev(values: &[f64], mean: f64) -> f64 {
    variance(values, mean).sqrt()
}

/// Standard score of `value`; `0.0` when the spread is zero
pub fn z_score(value: f64, mean: f64, std_dev: f64) -> f64 {
    if std_dev > 0.0 {
        (value - mean) / std_dev
    } else {
        0.0
    }
}

/// Absolute deviation from `baseline`, percent of |baseline|
pub fn percent_deviation(value: f64, baseline: f64) -> f64 {
    if baseline == 0.0 {
        return 0.0;
    }

    ((value - baseline) / baseline).abs() * 100.0
}

/// Mean and population standard deviation
pub fn mean_std(values: &[f64]) -> Result<(f64, f64)> {
    let m = mean(values)?;
    Ok((m, std_dev(values, m)))
}

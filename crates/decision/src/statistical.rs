//! Statistical significance testing for A/B experiments
//!
//! This module provides the two-proportion z-test used to compare
//! conversion rates between variants, the critical-value lookups and the
//! per-variant sample size planner.

use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};
use tracing::debug;

use crate::errors::{DecisionError, Result};

/// Statistical test trait
pub trait StatisticalTest {
    /// Perform the test and return p-value
    fn test(&self) -> Result<f64>;

    /// Check if result is significant at given alpha level
    fn is_significant(&self, alpha: f64) -> Result<bool> {
        Ok(self.test()? < alpha)
    }
}

/// Supported two-tailed confidence levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceLevel {
    Ninety,
    NinetyFive,
    NinetyNine,
}

impl ConfidenceLevel {
    /// Match a numeric level; `None` for anything else
    pub fn from_level(level: f64) -> Option<Self> {
        match level {
            l if (l - 0.90).abs() < 1e-9 => Some(ConfidenceLevel::Ninety),
            l if (l - 0.95).abs() < 1e-9 => Some(ConfidenceLevel::NinetyFive),
            l if (l - 0.99).abs() < 1e-9 => Some(ConfidenceLevel::NinetyNine),
            _ => None,
        }
    }

    pub fn level(&self) -> f64 {
        match self {
            ConfidenceLevel::Ninety => 0.90,
            ConfidenceLevel::NinetyFive => 0.95,
            ConfidenceLevel::NinetyNine => 0.99,
        }
    }

    /// Two-tailed critical z value
    pub fn z_critical(&self) -> f64 {
        match self {
            ConfidenceLevel::Ninety => 1.645,
            ConfidenceLevel::NinetyFive => 1.96,
            ConfidenceLevel::NinetyNine => 2.576,
        }
    }
}

/// Critical z for a confidence level, 1.96 when the level is not tabulated
pub fn z_critical(confidence: f64) -> f64 {
    ConfidenceLevel::from_level(confidence)
        .unwrap_or(ConfidenceLevel::NinetyFive)
        .z_critical()
}

/// One-tailed z for statistical power, nearest tabulated entry
pub fn z_beta(power: f64) -> f64 {
    const TABLE: [(f64, f64); 2] = [(0.80, 0.842), (0.90, 1.282)];

    let mut best = TABLE[0];
    for entry in TABLE.iter().skip(1) {
        if (entry.0 - power).abs() < (best.0 - power).abs() {
            best = *entry;
        }
    }
    best.1
}

fn standard_normal() -> Result<Normal> {
    Normal::new(0.0, 1.0).map_err(|e| DecisionError::StatisticalError(e.to_string()))
}

/// Two-proportion z-test for comparing conversion rates
///
/// Group 1 is the control, group 2 the treatment; a positive z means the
/// treatment converts better.
#[derive(Debug, Clone)]
pub struct ZTest {
    /// Successes in group 1
    pub successes_1: u64,
    /// Total trials in group 1
    pub trials_1: u64,
    /// Successes in group 2
    pub successes_2: u64,
    /// Total trials in group 2
    pub trials_2: u64,
}

impl ZTest {
    /// Create a new z-test
    pub fn new(successes_1: u64, trials_1: u64, successes_2: u64, trials_2: u64) -> Self {
        Self {
            successes_1,
            trials_1,
            successes_2,
            trials_2,
        }
    }

    /// Calculate sample proportions
    pub fn proportions(&self) -> (f64, f64) {
        let p1 = if self.trials_1 > 0 {
            self.successes_1 as f64 / self.trials_1 as f64
        } else {
            0.0
        };

        let p2 = if self.trials_2 > 0 {
            self.successes_2 as f64 / self.trials_2 as f64
        } else {
            0.0
        };

        (p1, p2)
    }

    /// Calculate pooled proportion
    pub fn pooled_proportion(&self) -> f64 {
        let total_successes = self.successes_1 + self.successes_2;
        let total_trials = self.trials_1 + self.trials_2;

        if total_trials > 0 {
            total_successes as f64 / total_trials as f64
        } else {
            0.0
        }
    }

    /// Pooled standard error of the difference
    pub fn standard_error(&self) -> f64 {
        if self.trials_1 == 0 || self.trials_2 == 0 {
            return 0.0;
        }

        let p_pool = self.pooled_proportion();
        let n1 = self.trials_1 as f64;
        let n2 = self.trials_2 as f64;

        (p_pool * (1.0 - p_pool) * (1.0 / n1 + 1.0 / n2)).sqrt()
    }

    /// z-statistic `(p2 - p1) / se`, `0.0` when it is undefined
    pub fn z_statistic(&self) -> f64 {
        let se = self.standard_error();
        if se == 0.0 {
            return 0.0;
        }

        let (p1, p2) = self.proportions();
        (p2 - p1) / se
    }

    /// Relative lift of group 2 over group 1, percent
    pub fn lift_percent(&self) -> f64 {
        let (p1, p2) = self.proportions();
        if p1 == 0.0 {
            return 0.0;
        }
        (p2 - p1) / p1 * 100.0
    }
}

impl StatisticalTest for ZTest {
    /// Perform two-tailed z-test and return p-value
    fn test(&self) -> Result<f64> {
        let z = self.z_statistic();
        let normal = standard_normal()?;

        // Two-tailed p-value
        let p_value = 2.0 * (1.0 - normal.cdf(z.abs()));

        debug!(
            "z-test: {}/{} vs {}/{}, z={:.4}, p={:.6}",
            self.successes_1, self.trials_1, self.successes_2, self.trials_2, z, p_value
        );

        Ok(p_value)
    }
}

/// Required per-variant sample size to detect a relative lift
///
/// `min_detectable_effect` is relative (0.2 means 10% -> 12%).
pub fn required_sample_size(
    baseline_rate: f64,
    min_detectable_effect: f64,
    confidence: f64,
    power: f64,
) -> Result<u64> {
    if baseline_rate <= 0.0 || baseline_rate >= 1.0 {
        return Err(DecisionError::InvalidRange(format!(
            "baseline rate must be between 0 and 1, got {}",
            baseline_rate
        )));
    }

    if min_detectable_effect <= 0.0 {
        return Err(DecisionError::InvalidRange(format!(
            "minimum detectable effect must be positive, got {}",
            min_detectable_effect
        )));
    }

    let p1 = baseline_rate;
    let p2 = baseline_rate * (1.0 + min_detectable_effect);

    if p2 >= 1.0 {
        return Err(DecisionError::InvalidRange(
            "Effect size too large, treatment rate exceeds 1.0".to_string(),
        ));
    }

    let z_alpha = z_critical(confidence);
    let z_b = z_beta(power);
    let p_avg = (p1 + p2) / 2.0;

    let numerator = z_alpha * (2.0 * p_avg * (1.0 - p_avg)).sqrt()
        + z_b * (p1 * (1.0 - p1) + p2 * (1.0 - p2)).sqrt();
    let n = numerator.powi(2) / (p2 - p1).powi(2);

    Ok(n.ceil() as u64)
}

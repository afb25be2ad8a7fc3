//! Campaign performance alerts and audience sizing types

use serde::{Deserialize, Serialize};

use crate::anomalies::AnomalySeverity;

/// Kind of threshold breach
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PerformanceAlertType {
    LowRoas,
    NoConversions,
    HighCpa,
    LowCtr,
}

/// Suggested operator action for an alert
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AlertAction {
    Pause,
    Optimize,
    Monitor,
    ScaleDown,
}

/// Threshold alert raised for one campaign
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceAlert {
    pub campaign_id: String,
    pub alert_type: PerformanceAlertType,
    /// Observed value (absent for count checks with no meaningful ratio)
    pub current_value: Option<f64>,
    pub threshold_value: f64,
    pub severity: AnomalySeverity,
    pub action: AlertAction,
    pub message: String,
    pub recommendation: String,
}

/// Lookalike audience size estimate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LookalikeEstimate {
    /// Similarity setting, 1 (closest) to 10 (broadest)
    pub similarity: u8,
    pub audience_size: u64,
    /// Expected match precision in `[0.1, 1.0]`
    pub match_precision: f64,
}

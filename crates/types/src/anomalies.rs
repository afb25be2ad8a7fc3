//! Anomaly types

use serde::{Deserialize, Serialize};

use crate::metrics::MetricKind;

/// Anomaly severity level
///
/// Ordered so that `Critical > Warning > Info`. The `low` / `moderate` labels
/// used by some dashboards map onto `Info` / `Warning`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalySeverity {
    /// Informational
    #[serde(alias = "low")]
    Info,
    /// Warning
    #[serde(alias = "moderate")]
    Warning,
    /// Critical
    Critical,
}

/// Which way the value moved relative to its history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyDirection {
    Spike,
    Drop,
}

/// A detected anomaly for one metric
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anomaly {
    /// Metric that deviated
    pub metric: MetricKind,
    /// Observed value
    pub current_value: f64,
    /// Historical mean
    pub expected_value: f64,
    /// Standard deviations from the historical mean
    pub z_score: f64,
    pub severity: AnomalySeverity,
    pub direction: AnomalyDirection,
    /// Absolute deviation from the historical mean, percent
    pub deviation_percent: f64,
    /// Human-readable description
    pub message: String,
    /// Suggested next step
    pub recommendation: String,
}

/// Current values of the composite anomaly metric set
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MetricSnapshot {
    pub spend: f64,
    pub roas: f64,
    pub ctr: f64,
    pub conversion_rate: f64,
    pub cpa: f64,
}

impl MetricSnapshot {
    /// Value for one metric of the composite set
    pub fn get(&self, metric: MetricKind) -> Option<f64> {
        match metric {
            MetricKind::Spend => Some(self.spend),
            MetricKind::Roas => Some(self.roas),
            MetricKind::Ctr => Some(self.ctr),
            MetricKind::ConversionRate => Some(self.conversion_rate),
            MetricKind::Cpa => Some(self.cpa),
            _ => None,
        }
    }
}

/// Historical values of the composite anomaly metric set, oldest first
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MetricHistory {
    pub spend: Vec<f64>,
    pub roas: Vec<f64>,
    pub ctr: Vec<f64>,
    pub conversion_rate: Vec<f64>,
    pub cpa: Vec<f64>,
}

impl MetricHistory {
    /// History for one metric of the composite set
    pub fn get(&self, metric: MetricKind) -> Option<&[f64]> {
        match metric {
            MetricKind::Spend => Some(&self.spend),
            MetricKind::Roas => Some(&self.roas),
            MetricKind::Ctr => Some(&self.ctr),
            MetricKind::ConversionRate => Some(&self.conversion_rate),
            MetricKind::Cpa => Some(&self.cpa),
            _ => None,
        }
    }

    /// Append one period of values
    pub fn push(&mut self, snapshot: &MetricSnapshot) {
        self.spend.push(snapshot.spend);
        self.roas.push(snapshot.roas);
        self.ctr.push(snapshot.ctr);
        self.conversion_rate.push(snapshot.conversion_rate);
        self.cpa.push(snapshot.cpa);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering() {
        assert!(AnomalySeverity::Critical > AnomalySeverity::Warning);
        assert!(AnomalySeverity::Warning > AnomalySeverity::Info);
    }

    #[test]
    fn test_severity_aliases() {
        let low: AnomalySeverity = serde_json::from_str("\"low\"").unwrap();
        let moderate: AnomalySeverity = serde_json::from_str("\"moderate\"").unwrap();
        assert_eq!(low, AnomalySeverity::Info);
        assert_eq!(moderate, AnomalySeverity::Warning);
    }

    #[test]
    fn test_history_push() {
        let mut history = MetricHistory::default();
        history.push(&MetricSnapshot { spend: 100.0, roas: 3.0, ..Default::default() });

        assert_eq!(history.get(MetricKind::Spend), Some(&[100.0][..]));
        assert_eq!(history.get(MetricKind::Revenue), None);
    }
}

//! Anomaly Detection
//!
//! Flags metric values that sit far from their own history. A value is
//! anomalous when its z-score against the history reaches `threshold_sigma`;
//! how bad it is depends on the metric's [`SeverityPolicy`]. Spend and CTR are
//! graded by z-score, while ROAS, conversion rate and CPA are graded by how far
//! they moved in the direction that hurts.

use adsignal_config::AnomalyConfig;
use adsignal_types::{
    Anomaly, AnomalyDirection, AnomalySeverity, MetricHistory, MetricKind, MetricSnapshot,
};
use tracing::{debug, info};

use crate::errors::{DecisionError, Result};
use crate::statistics;

/// Metrics checked by [`AnomalyDetector::detect_all`], in evaluation order
pub const COMPOSITE_METRICS: [MetricKind; 5] = [
    MetricKind::Spend,
    MetricKind::Roas,
    MetricKind::Ctr,
    MetricKind::ConversionRate,
    MetricKind::Cpa,
];

/// How a flagged deviation is graded
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SeverityPolicy {
    /// Critical at `critical_sigma` standard deviations, warning below
    ZScoreBands { critical_sigma: f64 },
    /// Graded by percent deviation from the mean in the watched direction;
    /// anything short of `warning` is info
    PercentDeviation {
        watch: AnomalyDirection,
        critical: f64,
        warning: f64,
    },
}

impl SeverityPolicy {
    /// Policy used for `metric`
    pub fn for_metric(metric: MetricKind, critical_sigma: f64) -> Self {
        match metric {
            MetricKind::Roas => SeverityPolicy::PercentDeviation {
                watch: AnomalyDirection::Drop,
                critical: 40.0,
                warning: 30.0,
            },
            MetricKind::ConversionRate => SeverityPolicy::PercentDeviation {
                watch: AnomalyDirection::Drop,
                critical: 40.0,
                warning: 25.0,
            },
            MetricKind::Cpa => SeverityPolicy::PercentDeviation {
                watch: AnomalyDirection::Spike,
                critical: 50.0,
                warning: 30.0,
            },
            _ => SeverityPolicy::ZScoreBands { critical_sigma },
        }
    }

    /// Grade a deviation that already crossed the detection threshold
    pub fn classify(
        &self,
        z_score: f64,
        deviation_percent: f64,
        direction: AnomalyDirection,
    ) -> AnomalySeverity {
        match *self {
            SeverityPolicy::ZScoreBands { critical_sigma } => {
                if z_score.abs() >= critical_sigma {
                    AnomalySeverity::Critical
                } else {
                    AnomalySeverity::Warning
                }
            }
            SeverityPolicy::PercentDeviation {
                watch,
                critical,
                warning,
            } => {
                if direction != watch {
                    AnomalySeverity::Info
                } else if deviation_percent >= critical {
                    AnomalySeverity::Critical
                } else if deviation_percent >= warning {
                    AnomalySeverity::Warning
                } else {
                    AnomalySeverity::Info
                }
            }
        }
    }
}

/// Z-score anomaly detector over per-metric history
#[derive(Debug, Clone)]
pub struct AnomalyDetector {
    /// |z| that marks a value as anomalous
    threshold_sigma: f64,
    /// |z| for critical on z-score banded metrics
    critical_sigma: f64,
    /// History length required before detection runs
    min_history: usize,
}

impl AnomalyDetector {
    /// Create new detector
    pub fn new(threshold_sigma: f64, min_history: usize) -> Result<Self> {
        if threshold_sigma <= 0.0 {
            return Err(DecisionError::InvalidConfig(
                "Threshold must be positive".to_string(),
            ));
        }

        if min_history < 2 {
            return Err(DecisionError::InvalidConfig(
                "Minimum history must be at least 2".to_string(),
            ));
        }

        Ok(Self {
            threshold_sigma,
            critical_sigma: threshold_sigma.max(3.0),
            min_history,
        })
    }

    /// Create detector from configuration
    pub fn from_config(config: &AnomalyConfig) -> Result<Self> {
        let mut detector = Self::new(config.threshold_sigma, config.min_history)?;
        if config.critical_sigma < config.threshold_sigma {
            return Err(DecisionError::InvalidConfig(
                "Critical sigma must not be below threshold sigma".to_string(),
            ));
        }
        detector.critical_sigma = config.critical_sigma;
        Ok(detector)
    }

    pub fn threshold_sigma(&self) -> f64 {
        self.threshold_sigma
    }

    pub fn min_history(&self) -> usize {
        self.min_history
    }

    /// Check one value against its history
    ///
    /// Returns `None` when the history is too short or the value is within
    /// `threshold_sigma` of the mean.
    pub fn detect(&self, metric: MetricKind, current_value: f64, history: &[f64]) -> Option<Anomaly> {
        if history.len() < self.min_history {
            debug!(
                "Skipping {} anomaly check: {} of {} required periods",
                metric,
                history.len(),
                self.min_history
            );
            return None;
        }

        let (mean, std_dev) = statistics::mean_std(history).ok()?;
        let z_score = statistics::z_score(current_value, mean, std_dev);

        if z_score.abs() < self.threshold_sigma {
            return None;
        }

        let direction = if current_value > mean {
            AnomalyDirection::Spike
        } else {
            AnomalyDirection::Drop
        };
        let deviation_percent = statistics::percent_deviation(current_value, mean);
        let severity = SeverityPolicy::for_metric(metric, self.critical_sigma)
            .classify(z_score, deviation_percent, direction);

        debug!(
            "Anomaly on {}: value={:.4}, mean={:.4}, z={:.2}, severity={:?}",
            metric, current_value, mean, z_score, severity
        );

        Some(Anomaly {
            metric,
            current_value,
            expected_value: mean,
            z_score,
            severity,
            direction,
            deviation_percent,
            message: describe(metric, direction, deviation_percent, z_score),
            recommendation: recommend(metric, direction).to_string(),
        })
    }

    /// Check every composite metric, most severe first
    pub fn detect_all(&self, current: &MetricSnapshot, history: &MetricHistory) -> Vec<Anomaly> {
        let mut anomalies: Vec<Anomaly> = COMPOSITE_METRICS
            .iter()
            .filter_map(|metric| {
                let value = current.get(*metric)?;
                let series = history.get(*metric)?;
                self.detect(*metric, value, series)
            })
            .collect();

        // Stable: equal severities keep metric order
        anomalies.sort_by(|a, b| b.severity.cmp(&a.severity));

        if !anomalies.is_empty() {
            info!(
                "Detected {} anomalies ({} critical)",
                anomalies.len(),
                anomalies
                    .iter()
                    .filter(|a| a.severity == AnomalySeverity::Critical)
                    .count()
            );
        }

        anomalies
    }
}

impl Default for AnomalyDetector {
    fn default() -> Self {
        Self {
            threshold_sigma: 2.0,
            critical_sigma: 3.0,
            min_history: 7,
        }
    }
}

fn describe(metric: MetricKind, direction: AnomalyDirection, deviation_percent: f64, z: f64) -> String {
    let label = match metric {
        MetricKind::Spend => "Ad spend",
        MetricKind::Revenue => "Revenue",
        MetricKind::Impressions => "Impressions",
        MetricKind::Clicks => "Clicks",
        MetricKind::Conversions => "Conversions",
        MetricKind::Roas => "ROAS",
        MetricKind::Ctr => "Click-through rate",
        MetricKind::Cpc => "Cost per click",
        MetricKind::Cpm => "CPM",
        MetricKind::Cpa => "Cost per acquisition",
        MetricKind::ConversionRate => "Conversion rate",
    };
    let movement = match direction {
        AnomalyDirection::Spike => "spiked",
        AnomalyDirection::Drop => "dropped",
    };

    format!(
        "{} {} {:.1}% from its recent average ({:.1} standard deviations)",
        label,
        movement,
        deviation_percent,
        z.abs()
    )
}

fn recommend(metric: MetricKind, direction: AnomalyDirection) -> &'static str {
    use AnomalyDirection::{Drop, Spike};

    match (metric, direction) {
        (MetricKind::Spend, Spike) => "Check for bid or budget changes and confirm delivery is intentional",
        (MetricKind::Spend, Drop) => "Check for exhausted budgets, disapproved ads or paused ad sets",
        (MetricKind::Roas, Drop) => "Review recent creative, audience and bid changes; shift budget to stronger campaigns",
        (MetricKind::Roas, Spike) => "Verify conversion tracking, then consider scaling the campaign",
        (MetricKind::Ctr, Drop) => "Refresh creatives and review audience targeting for ad fatigue",
        (MetricKind::Ctr, Spike) => "Confirm traffic quality and check for invalid clicks",
        (MetricKind::ConversionRate, Drop) => "Check landing page, checkout flow and conversion tracking",
        (MetricKind::ConversionRate, Spike) => "Verify conversion tracking is not double counting",
        (MetricKind::Cpa, Spike) => "Tighten targeting or lower bids to bring acquisition cost back in range",
        (MetricKind::Cpa, Drop) => "Acquisition cost improved; consider increasing budget",
        (_, Spike) => "Investigate the recent increase",
        (_, Drop) => "Investigate the recent decrease",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn stable_history(center: f64) -> Vec<f64> {
        // mean = center, population std = 1.0
        vec![
            center - 1.0,
            center + 1.0,
            center - 1.0,
            center + 1.0,
            center - 1.0,
            center + 1.0,
            center - 1.0,
            center + 1.0,
        ]
    }

    #[test]
    fn test_detector_creation() {
        assert!(AnomalyDetector::new(2.0, 7).is_ok());
        assert!(AnomalyDetector::new(0.0, 7).is_err());
        assert!(AnomalyDetector::new(2.0, 1).is_err());
    }

    #[test]
    fn test_short_history_returns_none() {
        let detector = AnomalyDetector::default();
        let history = vec![100.0, 101.0, 99.0, 100.0, 102.0, 98.0];

        assert!(detector.detect(MetricKind::Spend, 10_000.0, &history).is_none());
    }

    #[test]
    fn test_within_threshold_returns_none() {
        let detector = AnomalyDetector::default();
        let history = stable_history(100.0);

        assert!(detector.detect(MetricKind::Spend, 101.5, &history).is_none());
    }

    #[test]
    fn test_constant_history_never_flags() {
        let detector = AnomalyDetector::default();
        let history = vec![50.0; 10];

        assert!(detector.detect(MetricKind::Spend, 500.0, &history).is_none());
    }

    #[test]
    fn test_spend_z_score_bands() {
        let detector = AnomalyDetector::default();
        let history = stable_history(100.0);

        let warning = detector.detect(MetricKind::Spend, 102.5, &history).unwrap();
        assert_eq!(warning.severity, AnomalySeverity::Warning);
        assert_eq!(warning.direction, AnomalyDirection::Spike);
        assert_relative_eq!(warning.z_score, 2.5);
        assert_relative_eq!(warning.expected_value, 100.0);

        let critical = detector.detect(MetricKind::Spend, 96.0, &history).unwrap();
        assert_eq!(critical.severity, AnomalySeverity::Critical);
        assert_eq!(critical.direction, AnomalyDirection::Drop);
    }

    #[test]
    fn test_roas_drop_percent_bands() {
        let detector = AnomalyDetector::default();
        // mean 4.0, std 0.1
        let history = vec![3.9, 4.1, 3.9, 4.1, 3.9, 4.1, 3.9, 4.1];

        let critical = detector.detect(MetricKind::Roas, 2.0, &history).unwrap();
        assert_eq!(critical.severity, AnomalySeverity::Critical);
        assert_relative_eq!(critical.deviation_percent, 50.0, epsilon = 1e-9);

        let warning = detector.detect(MetricKind::Roas, 2.6, &history).unwrap();
        assert_eq!(warning.severity, AnomalySeverity::Warning);

        let info = detector.detect(MetricKind::Roas, 3.5, &history).unwrap();
        assert_eq!(info.severity, AnomalySeverity::Info);
    }

    #[test]
    fn test_value_at_threshold_is_flagged() {
        let detector = AnomalyDetector::default();
        let history = stable_history(100.0);

        let anomaly = detector.detect(MetricKind::Spend, 102.0, &history).unwrap();
        assert_relative_eq!(anomaly.z_score, 2.0);
        assert_eq!(anomaly.severity, AnomalySeverity::Warning);

        let critical = detector.detect(MetricKind::Spend, 97.0, &history).unwrap();
        assert_relative_eq!(critical.z_score, -3.0);
        assert_eq!(critical.severity, AnomalySeverity::Critical);
    }

    #[test]
    fn test_roas_band_edges() {
        let policy = SeverityPolicy::for_metric(MetricKind::Roas, 3.0);

        assert_eq!(
            policy.classify(-5.0, 40.0, AnomalyDirection::Drop),
            AnomalySeverity::Critical
        );
        assert_eq!(
            policy.classify(-5.0, 30.0, AnomalyDirection::Drop),
            AnomalySeverity::Warning
        );
        assert_eq!(
            policy.classify(-5.0, 29.9, AnomalyDirection::Drop),
            AnomalySeverity::Info
        );

        // mean 10.0, std 0.5: 6.0 is a 40% drop and 7.0 a 30% drop
        let detector = AnomalyDetector::default();
        let history = vec![9.5, 10.5, 9.5, 10.5, 9.5, 10.5, 9.5, 10.5];

        let critical = detector.detect(MetricKind::Roas, 6.0, &history).unwrap();
        assert_eq!(critical.severity, AnomalySeverity::Critical);

        let warning = detector.detect(MetricKind::Roas, 7.0, &history).unwrap();
        assert_eq!(warning.severity, AnomalySeverity::Warning);
    }

    #[test]
    fn test_roas_spike_is_info() {
        let detector = AnomalyDetector::default();
        let history = vec![3.9, 4.1, 3.9, 4.1, 3.9, 4.1, 3.9, 4.1];

        let anomaly = detector.detect(MetricKind::Roas, 8.0, &history).unwrap();
        assert_eq!(anomaly.direction, AnomalyDirection::Spike);
        assert_eq!(anomaly.severity, AnomalySeverity::Info);
    }

    #[test]
    fn test_cpa_spike_bands() {
        let detector = AnomalyDetector::default();
        // mean 20.0, std 1.0
        let history = stable_history(20.0);

        let critical = detector.detect(MetricKind::Cpa, 31.0, &history).unwrap();
        assert_eq!(critical.severity, AnomalySeverity::Critical);

        let warning = detector.detect(MetricKind::Cpa, 27.0, &history).unwrap();
        assert_eq!(warning.severity, AnomalySeverity::Warning);

        let drop = detector.detect(MetricKind::Cpa, 10.0, &history).unwrap();
        assert_eq!(drop.severity, AnomalySeverity::Info);
    }

    #[test]
    fn test_policy_lookup() {
        assert_eq!(
            SeverityPolicy::for_metric(MetricKind::Ctr, 3.0),
            SeverityPolicy::ZScoreBands { critical_sigma: 3.0 }
        );
        assert!(matches!(
            SeverityPolicy::for_metric(MetricKind::ConversionRate, 3.0),
            SeverityPolicy::PercentDeviation { watch: AnomalyDirection::Drop, .. }
        ));
    }

    #[test]
    fn test_detect_all_sorted_by_severity() {
        let detector = AnomalyDetector::default();
        let mut history = MetricHistory::default();
        for i in 0..8 {
            let offset = if i % 2 == 0 { -1.0 } else { 1.0 };
            history.push(&MetricSnapshot {
                spend: 100.0 + offset,
                roas: 4.0 + offset * 0.1,
                ctr: 2.0 + offset * 0.1,
                conversion_rate: 3.0 + offset * 0.1,
                cpa: 20.0 + offset,
            });
        }

        let current = MetricSnapshot {
            spend: 102.5,         // warning (z = 2.5)
            roas: 2.0,            // critical (50% drop)
            ctr: 2.0,             // normal
            conversion_rate: 2.6, // info (13% drop, z = -4)
            cpa: 20.0,            // normal
        };

        let anomalies = detector.detect_all(&current, &history);
        let metrics: Vec<MetricKind> = anomalies.iter().map(|a| a.metric).collect();

        assert_eq!(
            metrics,
            vec![MetricKind::Roas, MetricKind::Spend, MetricKind::ConversionRate]
        );
        assert_eq!(anomalies[2].severity, AnomalySeverity::Info);
    }

    #[test]
    fn test_anomaly_message() {
        let detector = AnomalyDetector::default();
        let history = stable_history(100.0);

        let anomaly = detector.detect(MetricKind::Spend, 105.0, &history).unwrap();
        assert!(anomaly.message.starts_with("Ad spend spiked 5.0%"));
        assert!(!anomaly.recommendation.is_empty());
    }
}

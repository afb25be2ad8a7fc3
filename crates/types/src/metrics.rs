//! Metrics and measurement types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Advertising metric tracked by the engine
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    Spend,
    Revenue,
    Impressions,
    Clicks,
    Conversions,
    Roas,
    Ctr,
    Cpc,
    Cpm,
    Cpa,
    ConversionRate,
}

impl MetricKind {
    /// Snake-case metric name
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricKind::Spend => "spend",
            MetricKind::Revenue => "revenue",
            MetricKind::Impressions => "impressions",
            MetricKind::Clicks => "clicks",
            MetricKind::Conversions => "conversions",
            MetricKind::Roas => "roas",
            MetricKind::Ctr => "ctr",
            MetricKind::Cpc => "cpc",
            MetricKind::Cpm => "cpm",
            MetricKind::Cpa => "cpa",
            MetricKind::ConversionRate => "conversion_rate",
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered observations of one metric, one value per period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSeries {
    /// Metric the values belong to
    pub metric: MetricKind,
    /// Chronological values, oldest first
    pub values: Vec<f64>,
}

impl MetricSeries {
    /// Create a new series
    pub fn new(metric: MetricKind, values: Vec<f64>) -> Self {
        Self { metric, values }
    }

    /// Number of periods
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if the series has no observations
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Most recent observation
    pub fn latest(&self) -> Option<f64> {
        self.values.last().copied()
    }

    /// Regression input with `x` set to the period index
    pub fn to_points(&self) -> Vec<SeriesPoint> {
        self.values
            .iter()
            .enumerate()
            .map(|(i, y)| SeriesPoint::new(i as f64, *y))
            .collect()
    }
}

/// One `(x, y)` observation for regression
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub x: f64,
    pub y: f64,
}

impl SeriesPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Spend and revenue for one period of a ROAS forecast
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoasObservation {
    /// Ad spend in the period
    pub ad_spend: f64,
    /// Attributed revenue in the period
    pub revenue: f64,
}

impl RoasObservation {
    pub fn new(ad_spend: f64, revenue: f64) -> Self {
        Self { ad_spend, revenue }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_kind_names() {
        assert_eq!(MetricKind::ConversionRate.to_string(), "conversion_rate");
        assert_eq!(MetricKind::Roas.as_str(), "roas");

        let json = serde_json::to_string(&MetricKind::ConversionRate).unwrap();
        assert_eq!(json, "\"conversion_rate\"");
    }

    #[test]
    fn test_series_points() {
        let series = MetricSeries::new(MetricKind::Spend, vec![10.0, 20.0, 30.0]);
        let points = series.to_points();

        assert_eq!(series.len(), 3);
        assert_eq!(series.latest(), Some(30.0));
        assert_eq!(points[2], SeriesPoint::new(2.0, 30.0));
    }
}

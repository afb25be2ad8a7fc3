//! Forecast types

use serde::{Deserialize, Serialize};

/// Direction of a fitted trend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Up,
    Down,
    Stable,
}

/// One extrapolated period
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    /// Zero-based period index continuing the input series
    pub period_index: usize,
    pub predicted_value: f64,
    pub lower_bound: f64,
    pub upper_bound: f64,
}

/// Linear trend fit and its extrapolation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendForecast {
    pub slope: f64,
    pub intercept: f64,
    /// Fraction of variance explained by the fit
    pub r_squared: f64,
    /// Residual standard error
    pub std_error: f64,
    pub trend: TrendDirection,
    pub points: Vec<ForecastPoint>,
}

/// ROAS forecast that keeps spend and revenue context
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoasForecast {
    /// Trend fit of the per-period ROAS ratio
    pub forecast: TrendForecast,
    /// Historical average ad spend, held constant over the horizon
    pub average_ad_spend: f64,
    /// Historical average revenue
    pub average_revenue: f64,
    /// Predicted revenue per forecast point at the average spend
    pub projected_revenue: Vec<f64>,
}

/// Level-only forecast of the next period
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum BaselineMethod {
    /// Mean of the history with a 95% normal interval
    SimpleAverage,
    /// Exponentially weighted level, recent values weighted by `alpha`
    ExponentialSmoothing { alpha: f64 },
}

impl Default for BaselineMethod {
    fn default() -> Self {
        BaselineMethod::ExponentialSmoothing { alpha: 0.3 }
    }
}

/// Baseline forecast of the next period
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BaselineForecast {
    pub method: BaselineMethod,
    pub predicted_value: f64,
    /// Heuristic confidence in the level, grows with history length
    pub confidence: f64,
    /// Prediction interval, only for methods that produce one
    pub lower_bound: Option<f64>,
    pub upper_bound: Option<f64>,
    pub data_points: usize,
}

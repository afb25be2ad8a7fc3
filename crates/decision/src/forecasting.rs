//! Linear trend forecasting
//!
//! Ordinary least squares over `(x, y)` observations, extrapolated a fixed
//! number of periods with a residual-error confidence band. Every tracked
//! metric is non-negative, so forecast values and bands are floored at zero.
//!
//! [`TrendForecaster::forecast_baseline`] covers the level-only case: a
//! simple average or an exponentially smoothed level for the next period.

use adsignal_config::ForecastConfig;
use adsignal_types::{
    BaselineForecast, BaselineMethod, ForecastPoint, MetricKind, MetricSeries, RoasForecast,
    RoasObservation, SeriesPoint, TrendDirection, TrendForecast,
};
use tracing::{debug, warn};

use crate::errors::{DecisionError, Result};
use crate::performance::calculate_roas;
use crate::statistical::z_critical;
use crate::statistics;

/// Fitted regression line
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
    pub std_error: f64,
    /// Mean of the observed `y`
    pub mean_y: f64,
}

impl LinearFit {
    /// Fit a line through `points` (at least 2)
    pub fn fit(points: &[SeriesPoint]) -> Result<Self> {
        if points.len() < 2 {
            return Err(DecisionError::InsufficientData(format!(
                "need at least 2 data points, got {}",
                points.len()
            )));
        }

        let n = points.len() as f64;
        let sum_x: f64 = points.iter().map(|p| p.x).sum();
        let sum_y: f64 = points.iter().map(|p| p.y).sum();
        let sum_xy: f64 = points.iter().map(|p| p.x * p.y).sum();
        let sum_x2: f64 = points.iter().map(|p| p.x * p.x).sum();

        let denominator = n * sum_x2 - sum_x * sum_x;
        let slope = if denominator == 0.0 {
            warn!("All x values identical, fitting a flat line");
            0.0
        } else {
            (n * sum_xy - sum_x * sum_y) / denominator
        };

        let mean_x = sum_x / n;
        let mean_y = sum_y / n;
        let intercept = mean_y - slope * mean_x;

        let ss_tot: f64 = points.iter().map(|p| (p.y - mean_y).powi(2)).sum();
        let ss_res: f64 = points
            .iter()
            .map(|p| (p.y - (slope * p.x + intercept)).powi(2))
            .sum();

        let r_squared = if ss_tot == 0.0 { 0.0 } else { 1.0 - ss_res / ss_tot };

        // Two points always fit exactly
        let std_error = if points.len() > 2 {
            (ss_res / (n - 2.0)).sqrt()
        } else {
            0.0
        };

        Ok(Self {
            slope,
            intercept,
            r_squared,
            std_error,
            mean_y,
        })
    }

    /// Predicted `y` at `x`
    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// OLS trend forecaster
#[derive(Debug, Clone)]
pub struct TrendForecaster {
    stable_slope_epsilon: f64,
    relative_slope_epsilon: f64,
    band_sigma: f64,
}

impl TrendForecaster {
    /// Create new forecaster
    pub fn new(config: &ForecastConfig) -> Result<Self> {
        if config.stable_slope_epsilon < 0.0 || config.relative_slope_epsilon < 0.0 {
            return Err(DecisionError::InvalidConfig(
                "Slope epsilons must be non-negative".to_string(),
            ));
        }

        if config.band_sigma < 0.0 {
            return Err(DecisionError::InvalidConfig(
                "Band sigma must be non-negative".to_string(),
            ));
        }

        Ok(Self {
            stable_slope_epsilon: config.stable_slope_epsilon,
            relative_slope_epsilon: config.relative_slope_epsilon,
            band_sigma: config.band_sigma,
        })
    }

    /// Classify a fitted slope
    pub fn trend_direction(&self, fit: &LinearFit) -> TrendDirection {
        let epsilon = self
            .stable_slope_epsilon
            .max(self.relative_slope_epsilon * fit.mean_y.abs());

        if fit.slope.abs() < epsilon {
            TrendDirection::Stable
        } else if fit.slope > 0.0 {
            TrendDirection::Up
        } else {
            TrendDirection::Down
        }
    }

    /// Fit `series` and extrapolate `periods_ahead` periods past its end
    pub fn forecast(
        &self,
        metric: MetricKind,
        series: &[SeriesPoint],
        periods_ahead: usize,
    ) -> Result<TrendForecast> {
        let fit = LinearFit::fit(series)?;
        let trend = self.trend_direction(&fit);
        let n = series.len();
        let margin = self.band_sigma * fit.std_error;

        let points = (1..=periods_ahead)
            .map(|i| {
                let period_index = n + i - 1;
                let predicted = fit.predict(period_index as f64);
                ForecastPoint {
                    period_index,
                    predicted_value: predicted.max(0.0),
                    lower_bound: (predicted - margin).max(0.0),
                    upper_bound: (predicted + margin).max(0.0),
                }
            })
            .collect();

        debug!(
            "Forecast {}: n={}, slope={:.4}, intercept={:.4}, r2={:.4}, se={:.4}, trend={:?}",
            metric, n, fit.slope, fit.intercept, fit.r_squared, fit.std_error, trend
        );

        Ok(TrendForecast {
            slope: fit.slope,
            intercept: fit.intercept,
            r_squared: fit.r_squared,
            std_error: fit.std_error,
            trend,
            points,
        })
    }

    /// Forecast a plain value sequence with `x = 0..n`
    pub fn forecast_values(
        &self,
        metric: MetricKind,
        values: &[f64],
        periods_ahead: usize,
    ) -> Result<TrendForecast> {
        let points: Vec<SeriesPoint> = values
            .iter()
            .enumerate()
            .map(|(i, y)| SeriesPoint::new(i as f64, *y))
            .collect();
        self.forecast(metric, &points, periods_ahead)
    }

    /// Forecast a [`MetricSeries`]
    pub fn forecast_series(&self, series: &MetricSeries, periods_ahead: usize) -> Result<TrendForecast> {
        self.forecast(series.metric, &series.to_points(), periods_ahead)
    }

    /// Forecast ROAS from per-period spend and revenue
    ///
    /// Spend and revenue are held at their historical averages, so projected
    /// revenue is the predicted ROAS applied to the average spend.
    pub fn forecast_roas(
        &self,
        observations: &[RoasObservation],
        periods_ahead: usize,
    ) -> Result<RoasForecast> {
        if observations.len() < 2 {
            return Err(DecisionError::InsufficientData(
                "need at least 2 data points".to_string(),
            ));
        }

        let roas: Vec<f64> = observations
            .iter()
            .map(|o| calculate_roas(o.revenue, o.ad_spend))
            .collect();
        let forecast = self.forecast_values(MetricKind::Roas, &roas, periods_ahead)?;

        let n = observations.len() as f64;
        let average_ad_spend = observations.iter().map(|o| o.ad_spend).sum::<f64>() / n;
        let average_revenue = observations.iter().map(|o| o.revenue).sum::<f64>() / n;

        let projected_revenue = forecast
            .points
            .iter()
            .map(|p| p.predicted_value * average_ad_spend)
            .collect();

        Ok(RoasForecast {
            forecast,
            average_ad_spend,
            average_revenue,
            projected_revenue,
        })
    }

    /// Next-period level of `values` without a trend term
    pub fn forecast_baseline(&self, values: &[f64], method: BaselineMethod) -> Result<BaselineForecast> {
        if values.is_empty() {
            return Err(DecisionError::InsufficientData(
                "need at least 1 data point".to_string(),
            ));
        }

        let n = values.len();
        let forecast = match method {
            BaselineMethod::SimpleAverage => {
                let (mean, std_dev) = statistics::mean_std(values)?;
                let margin = z_critical(0.95) * std_dev;
                BaselineForecast {
                    method,
                    predicted_value: mean,
                    confidence: if n >= 7 { 0.7 } else { 0.5 },
                    lower_bound: Some((mean - margin).max(0.0)),
                    upper_bound: Some(mean + margin),
                    data_points: n,
                }
            }
            BaselineMethod::ExponentialSmoothing { alpha } => {
                if !(alpha > 0.0 && alpha <= 1.0) {
                    return Err(DecisionError::InvalidRange(format!(
                        "smoothing alpha must be in (0, 1], got {}",
                        alpha
                    )));
                }

                let level = values[1..]
                    .iter()
                    .fold(values[0], |level, v| alpha * v + (1.0 - alpha) * level);
                BaselineForecast {
                    method,
                    predicted_value: level,
                    confidence: if n >= 14 { 0.75 } else { 0.6 },
                    lower_bound: None,
                    upper_bound: None,
                    data_points: n,
                }
            }
        };

        debug!(
            "Baseline forecast ({:?}) over {} points: {:.4}",
            method, n, forecast.predicted_value
        );

        Ok(forecast)
    }
}

impl Default for TrendForecaster {
    fn default() -> Self {
        Self {
            stable_slope_epsilon: 0.01,
            relative_slope_epsilon: 0.001,
            band_sigma: 2.0,
        }
    }
}

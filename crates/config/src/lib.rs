//! Configuration management for the advertising signal decision engine

use figment::{Figment, providers::{Format, Yaml, Env}};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Main engine configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Anomaly detection settings
    pub anomaly: AnomalyConfig,

    /// Trend forecasting settings
    pub forecast: ForecastConfig,

    /// A/B significance testing settings
    pub significance: SignificanceConfig,

    /// Budget allocation settings
    pub budget: BudgetConfig,

    /// Bid adjustment settings
    pub bids: BidConfig,

    /// Spend pacing settings
    pub pacing: PacingConfig,

    /// Campaign performance alert thresholds
    pub alerts: AlertThresholds,

    /// Observability settings
    pub observability: ObservabilityConfig,
}

impl EngineConfig {
    /// Load configuration from file and environment
    pub fn load(config_path: Option<PathBuf>) -> Result<Self> {
        let mut figment = Figment::new();

        if let Some(path) = config_path {
            figment = figment.merge(Yaml::file(path));
        }

        // Environment wins (ADSIGNAL_PACING__TOLERANCE_PERCENT=15)
        figment = figment.merge(Env::prefixed("ADSIGNAL_").split("__"));

        figment.extract().map_err(|e| ConfigError::LoadError(e.to_string()))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.anomaly.threshold_sigma <= 0.0 {
            return Err(ConfigError::ValidationError(
                "anomaly.threshold_sigma must be positive".to_string(),
            ));
        }

        if self.anomaly.critical_sigma < self.anomaly.threshold_sigma {
            return Err(ConfigError::ValidationError(
                "anomaly.critical_sigma must be >= anomaly.threshold_sigma".to_string(),
            ));
        }

        if self.anomaly.min_history < 2 {
            return Err(ConfigError::ValidationError(
                "anomaly.min_history must be at least 2".to_string(),
            ));
        }

        if self.forecast.stable_slope_epsilon < 0.0 || self.forecast.relative_slope_epsilon < 0.0 {
            return Err(ConfigError::ValidationError(
                "forecast slope epsilons must be non-negative".to_string(),
            ));
        }

        if self.forecast.band_sigma < 0.0 {
            return Err(ConfigError::ValidationError(
                "forecast.band_sigma must be non-negative".to_string(),
            ));
        }

        let level = self.significance.confidence_level;
        if level <= 0.0 || level >= 1.0 {
            return Err(ConfigError::ValidationError(format!(
                "significance.confidence_level must be in (0, 1), got {}",
                level
            )));
        }

        let power = self.significance.power;
        if power <= 0.0 || power >= 1.0 {
            return Err(ConfigError::ValidationError(format!(
                "significance.power must be in (0, 1), got {}",
                power
            )));
        }

        if let Some(min) = self.budget.min_budget_per_campaign {
            if min < 0.0 {
                return Err(ConfigError::ValidationError(
                    "budget.min_budget_per_campaign must be non-negative".to_string(),
                ));
            }
        }

        if self.budget.target_roas <= 0.0 {
            return Err(ConfigError::ValidationError(
                "budget.target_roas must be positive".to_string(),
            ));
        }

        if self.bids.max_adjustment_percent <= 0.0 || self.bids.learning_rate <= 0.0 {
            return Err(ConfigError::ValidationError(
                "bids.max_adjustment_percent and bids.learning_rate must be positive".to_string(),
            ));
        }

        let confidence = self.bids.min_confidence;
        if !(0.0..=1.0).contains(&confidence) {
            return Err(ConfigError::ValidationError(format!(
                "bids.min_confidence must be in [0, 1], got {}",
                confidence
            )));
        }

        if self.pacing.tolerance_percent <= 0.0 {
            return Err(ConfigError::ValidationError(
                "pacing.tolerance_percent must be positive".to_string(),
            ));
        }

        if self.alerts.min_roas < 0.0 || self.alerts.min_ctr < 0.0 {
            return Err(ConfigError::ValidationError(
                "alert thresholds must be non-negative".to_string(),
            ));
        }

        Ok(())
    }
}

/// Anomaly detection configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnomalyConfig {
    /// |z| at or above which a value is anomalous
    pub threshold_sigma: f64,

    /// |z| at or above which z-score banded metrics are critical
    pub critical_sigma: f64,

    /// Minimum history length before detection runs
    pub min_history: usize,
}

impl Default for AnomalyConfig {
    fn default() -> Self {
        Self {
            threshold_sigma: 2.0,
            critical_sigma: 3.0,
            min_history: 7,
        }
    }
}

/// Trend forecasting configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    /// Absolute slope below which a trend is stable
    pub stable_slope_epsilon: f64,

    /// Slope below this fraction of |mean| is stable
    pub relative_slope_epsilon: f64,

    /// Confidence band half-width in residual standard errors
    pub band_sigma: f64,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            stable_slope_epsilon: 0.01,
            relative_slope_epsilon: 0.001,
            band_sigma: 2.0,
        }
    }
}

/// A/B significance testing configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignificanceConfig {
    /// Confidence level (0.90, 0.95 or 0.99)
    pub confidence_level: f64,

    /// Statistical power for sample size planning
    pub power: f64,

    /// Impressions each variant needs before a verdict
    pub min_sample_size: u64,
}

impl Default for SignificanceConfig {
    fn default() -> Self {
        Self {
            confidence_level: 0.95,
            power: 0.8,
            min_sample_size: 1000,
        }
    }
}

/// Budget allocation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BudgetConfig {
    /// Default floor applied to every campaign
    pub min_budget_per_campaign: Option<f64>,

    /// Target ROAS for scaling recommendations
    pub target_roas: f64,
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self {
            min_budget_per_campaign: None,
            target_roas: 2.0,
        }
    }
}

/// Bid adjustment configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BidConfig {
    /// Largest bid change in either direction, percent
    pub max_adjustment_percent: f64,

    /// Recommendations below this confidence are dropped
    pub min_confidence: f64,

    /// Scales how hard ROAS distance moves the bid
    pub learning_rate: f64,

    /// CTR (percent) reference for the click-quality rule
    pub min_ctr: f64,
}

impl Default for BidConfig {
    fn default() -> Self {
        Self {
            max_adjustment_percent: 20.0,
            min_confidence: 0.7,
            learning_rate: 0.5,
            min_ctr: 2.0,
        }
    }
}

/// Spend pacing configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PacingConfig {
    /// Allowed gap between percent spent and percent elapsed
    pub tolerance_percent: f64,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            tolerance_percent: 10.0,
        }
    }
}

/// Campaign performance alert thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertThresholds {
    /// ROAS below this raises `low_roas`
    pub min_roas: f64,

    /// CTR (percent) below this raises `low_ctr`
    pub min_ctr: f64,

    /// Fewer conversions than this raises `no_conversions`
    pub min_conversions: u64,

    /// CPA above this raises `high_cpa`
    pub max_cpa: Option<f64>,

    /// Spend needed before conversions are checked
    pub min_spend_for_conversion_check: f64,

    /// Impressions needed before CTR is checked
    pub min_impressions_for_ctr: u64,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            min_roas: 1.5,
            min_ctr: 1.0,
            min_conversions: 1,
            max_cpa: None,
            min_spend_for_conversion_check: 50.0,
            min_impressions_for_ctr: 1000,
        }
    }
}

/// Observability configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level
    pub log_level: String,

    /// Enable structured JSON logging
    pub json_logging: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logging: false,
        }
    }
}

//! Core types and data models for the advertising signal decision engine
//!
//! This crate provides the plain value objects that cross the engine boundary:
//! metric series, campaign snapshots, anomalies, forecasts, A/B verdicts,
//! budget allocations and pacing states. None of them carry behavior beyond
//! construction helpers; the computations live in the `decision` crate.

pub mod metrics;
pub mod campaigns;
pub mod anomalies;
pub mod forecasts;
pub mod experiments;
pub mod budget;
pub mod alerts;

pub use alerts::{AlertAction, LookalikeEstimate, PerformanceAlert, PerformanceAlertType};
pub use anomalies::{Anomaly, AnomalyDirection, AnomalySeverity, MetricHistory, MetricSnapshot};
pub use budget::{
    BidImpact, BidRecommendation, BudgetConstraint, BudgetOptimization, CampaignAllocation,
    ExpectedImpact, PacingState, PacingStatus, ScalingAction, ScalingRecommendation,
};
pub use campaigns::{
    AdPlatform, AggregatedPerformance, CampaignSnapshot, CampaignStatus, PerformanceMetrics,
    PlatformPerformance,
};
pub use experiments::{ABTestVerdict, TestStatus, VariantMetrics, VariantResult};
pub use forecasts::{
    BaselineForecast, BaselineMethod, ForecastPoint, RoasForecast, TrendDirection, TrendForecast,
};
pub use metrics::{MetricKind, MetricSeries, RoasObservation, SeriesPoint};

//! Statistical decision engine for advertising performance
//!
//! This crate turns raw advertising time series and campaign snapshots into
//! actionable signals: anomaly alerts, trend and baseline forecasts, A/B test
//! verdicts, ROAS-weighted budget reallocations, bid adjustments and spend
//! pacing states. Every
//! component is a pure computation over its inputs.

pub mod statistics;
pub mod performance;
pub mod anomaly_detection;
pub mod forecasting;
pub mod statistical;
pub mod ab_testing;
pub mod budget_optimizer;
pub mod pacing;
pub mod performance_alerts;
pub mod audience;
pub mod engine;
pub mod errors;

pub use statistics::{mean, percent_deviation, std_dev, variance, z_score};
pub use performance::{
    aggregate_campaign_performance, calculate_conversion_rate, calculate_cpa, calculate_cpc,
    calculate_cpm, calculate_ctr, calculate_roas, calculate_roas_strict, campaign_performance,
    incremental_roas,
};
pub use anomaly_detection::{AnomalyDetector, SeverityPolicy};
pub use forecasting::{LinearFit, TrendForecaster};
pub use statistical::{
    required_sample_size, z_beta, z_critical, ConfidenceLevel, StatisticalTest, ZTest,
};
pub use ab_testing::SignificanceTester;
pub use budget_optimizer::{recommend_scaling, BidAdvisor, BudgetAllocator};
pub use pacing::{attention_list, calculate_budget_pacing, BudgetPeriod, PacingMonitor};
pub use performance_alerts::{CampaignCheck, PerformanceAlertChecker};
pub use audience::estimate_lookalike;
pub use engine::DecisionEngine;
pub use errors::{DecisionError, Result};

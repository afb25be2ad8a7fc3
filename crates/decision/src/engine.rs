//! Decision engine facade
//!
//! Builds every component from one [`EngineConfig`]. The engine holds no
//! mutable state after construction and can be shared freely across threads.

use adsignal_config::EngineConfig;
use adsignal_types::{
    ABTestVerdict, Anomaly, BidRecommendation, BudgetConstraint, BudgetOptimization,
    CampaignSnapshot, MetricHistory, MetricSeries, MetricSnapshot, PacingState, TrendForecast,
    VariantResult,
};
use chrono::{DateTime, Utc};
use tracing::info;

use crate::{
    ab_testing::SignificanceTester,
    anomaly_detection::AnomalyDetector,
    budget_optimizer::{BidAdvisor, BudgetAllocator},
    errors::Result,
    forecasting::TrendForecaster,
    pacing::{BudgetPeriod, PacingMonitor},
    performance_alerts::{CampaignCheck, PerformanceAlertChecker},
};

/// All decision components configured together
#[derive(Debug, Clone)]
pub struct DecisionEngine {
    anomaly_detector: AnomalyDetector,
    forecaster: TrendForecaster,
    significance: SignificanceTester,
    allocator: BudgetAllocator,
    bids: BidAdvisor,
    pacing: PacingMonitor,
    alerts: PerformanceAlertChecker,
}

impl DecisionEngine {
    /// Validate `config` and build every component
    pub fn new(config: &EngineConfig) -> Result<Self> {
        config.validate()?;

        let engine = Self {
            anomaly_detector: AnomalyDetector::from_config(&config.anomaly)?,
            forecaster: TrendForecaster::new(&config.forecast)?,
            significance: SignificanceTester::new(config)?,
            allocator: BudgetAllocator::new(&config.budget)?,
            bids: BidAdvisor::new(&config.bids, config.budget.target_roas)?,
            pacing: PacingMonitor::new(&config.pacing)?,
            alerts: PerformanceAlertChecker::new(&config.alerts),
        };

        info!(
            "Decision engine ready: anomaly sigma={}, confidence={}, pacing tolerance={}%",
            config.anomaly.threshold_sigma,
            config.significance.confidence_level,
            config.pacing.tolerance_percent
        );

        Ok(engine)
    }

    pub fn anomaly_detector(&self) -> &AnomalyDetector {
        &self.anomaly_detector
    }

    pub fn forecaster(&self) -> &TrendForecaster {
        &self.forecaster
    }

    pub fn significance_tester(&self) -> &SignificanceTester {
        &self.significance
    }

    pub fn budget_allocator(&self) -> &BudgetAllocator {
        &self.allocator
    }

    pub fn bid_advisor(&self) -> &BidAdvisor {
        &self.bids
    }

    pub fn pacing_monitor(&self) -> &PacingMonitor {
        &self.pacing
    }

    pub fn alert_checker(&self) -> &PerformanceAlertChecker {
        &self.alerts
    }

    /// Composite anomaly scan
    pub fn detect_anomalies(&self, current: &MetricSnapshot, history: &MetricHistory) -> Vec<Anomaly> {
        self.anomaly_detector.detect_all(current, history)
    }

    /// Trend forecast of a metric series
    pub fn forecast(&self, series: &MetricSeries, periods_ahead: usize) -> Result<TrendForecast> {
        self.forecaster.forecast_series(series, periods_ahead)
    }

    /// A/B verdict
    pub fn compare_variants(&self, variants: &[VariantResult]) -> Result<ABTestVerdict> {
        self.significance.compare_variants(variants)
    }

    /// Budget reallocation
    pub fn optimize_budget(
        &self,
        campaigns: &[CampaignSnapshot],
        constraint: &BudgetConstraint,
    ) -> Result<BudgetOptimization> {
        self.allocator.optimize(campaigns, constraint)
    }

    /// Bid changes across campaigns
    pub fn recommend_bids(&self, campaigns: &[CampaignSnapshot]) -> Vec<BidRecommendation> {
        self.bids.recommend_all(campaigns)
    }

    /// Pacing for many budget periods at one instant
    pub fn pace_all(&self, periods: &[(BudgetPeriod, f64)], as_of: DateTime<Utc>) -> Vec<PacingState> {
        periods
            .iter()
            .map(|(period, spend)| self.pacing.pace(period, *spend, as_of))
            .collect()
    }

    /// Threshold alerts across campaigns
    pub fn check_campaigns(&self, campaigns: &[CampaignSnapshot]) -> Vec<CampaignCheck> {
        self.alerts.check_campaigns(campaigns)
    }
}

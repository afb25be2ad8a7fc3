//! Spend pacing
//!
//! Compares the share of budget spent with the share of the flight elapsed.
//! The evaluation instant is always passed in, so results do not depend on
//! the wall clock.

use adsignal_config::PacingConfig;
use adsignal_types::{PacingState, PacingStatus};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::errors::{DecisionError, Result};

/// Default allowed gap between percent spent and percent elapsed
pub const DEFAULT_TOLERANCE_PERCENT: f64 = 10.0;

/// A campaign's budget window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetPeriod {
    pub campaign_id: String,
    pub total_budget: f64,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl BudgetPeriod {
    /// Create a validated budget period
    pub fn new(
        campaign_id: impl Into<String>,
        total_budget: f64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Self> {
        if total_budget <= 0.0 {
            return Err(DecisionError::InvalidConfig(format!(
                "Total budget must be positive, got {}",
                total_budget
            )));
        }

        if end <= start {
            return Err(DecisionError::InvalidRange(
                "Budget period must end after it starts".to_string(),
            ));
        }

        Ok(Self {
            campaign_id: campaign_id.into(),
            total_budget,
            start,
            end,
        })
    }

    /// Length of the period in whole days, rounded up
    pub fn total_days(&self) -> i64 {
        ceil_days(self.end - self.start)
    }
}

const MILLIS_PER_DAY: f64 = 86_400_000.0;

fn ceil_days(span: Duration) -> i64 {
    (span.num_milliseconds() as f64 / MILLIS_PER_DAY).ceil() as i64
}

/// Budget pacing monitor
#[derive(Debug, Clone)]
pub struct PacingMonitor {
    tolerance_percent: f64,
}

impl PacingMonitor {
    /// Create new monitor
    pub fn new(config: &PacingConfig) -> Result<Self> {
        if config.tolerance_percent <= 0.0 {
            return Err(DecisionError::InvalidConfig(
                "Pacing tolerance must be positive".to_string(),
            ));
        }

        Ok(Self {
            tolerance_percent: config.tolerance_percent,
        })
    }

    pub fn tolerance_percent(&self) -> f64 {
        self.tolerance_percent
    }

    /// Pacing state of `period` at `as_of`
    pub fn pace(&self, period: &BudgetPeriod, current_spend: f64, as_of: DateTime<Utc>) -> PacingState {
        let total_days = period.total_days();
        let days_elapsed = ceil_days(as_of - period.start).max(0);
        let days_remaining = (total_days - days_elapsed).max(0);

        let remaining_budget = period.total_budget - current_spend;
        let percent_elapsed = if total_days > 0 {
            days_elapsed as f64 / total_days as f64 * 100.0
        } else {
            0.0
        };
        let percent_spent = current_spend / period.total_budget * 100.0;
        let pacing_percent = percent_spent - percent_elapsed;

        let status = if remaining_budget <= 0.0 {
            PacingStatus::Depleted
        } else if pacing_percent > self.tolerance_percent {
            PacingStatus::Overspending
        } else if pacing_percent < -self.tolerance_percent {
            PacingStatus::Underspending
        } else {
            PacingStatus::OnTrack
        };

        let daily_run_rate = if days_elapsed > 0 {
            current_spend / days_elapsed as f64
        } else {
            0.0
        };
        let projected_total_spend = daily_run_rate * total_days as f64;

        match status {
            PacingStatus::Depleted => warn!(
                "Campaign {} budget depleted: spent {:.2} of {:.2}",
                period.campaign_id, current_spend, period.total_budget
            ),
            _ => debug!(
                "Campaign {} pacing {:+.1}% ({:?}), day {}/{}",
                period.campaign_id, pacing_percent, status, days_elapsed, total_days
            ),
        }

        PacingState {
            campaign_id: period.campaign_id.clone(),
            total_budget: period.total_budget,
            current_spend,
            remaining_budget,
            total_days,
            days_elapsed,
            days_remaining,
            percent_elapsed,
            percent_spent,
            pacing_percent,
            status,
            daily_run_rate,
            projected_total_spend,
        }
    }
}

impl Default for PacingMonitor {
    fn default() -> Self {
        Self {
            tolerance_percent: DEFAULT_TOLERANCE_PERCENT,
        }
    }
}

/// Overspending and depleted campaigns, largest pacing gap first
pub fn attention_list(states: &[PacingState]) -> Vec<PacingState> {
    let mut flagged: Vec<PacingState> = states
        .iter()
        .filter(|s| s.status.needs_attention())
        .cloned()
        .collect();

    flagged.sort_by(|a, b| b.pacing_percent.abs().total_cmp(&a.pacing_percent.abs()));
    flagged
}

/// One-shot pacing check with the default tolerance
pub fn calculate_budget_pacing(
    campaign_id: impl Into<String>,
    total_budget: f64,
    current_spend: f64,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    as_of: DateTime<Utc>,
) -> Result<PacingState> {
    let period = BudgetPeriod::new(campaign_id, total_budget, start, end)?;
    Ok(PacingMonitor::default().pace(&period, current_spend, as_of))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::TimeZone;

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 11, day, 0, 0, 0).unwrap()
    }

    fn november(budget: f64) -> BudgetPeriod {
        // 30-day flight
        BudgetPeriod::new("c1", budget, at(1), Utc.with_ymd_and_hms(2025, 12, 1, 0, 0, 0).unwrap()).unwrap()
    }

    #[test]
    fn test_period_validation() {
        assert!(matches!(
            BudgetPeriod::new("c1", 0.0, at(1), at(10)),
            Err(DecisionError::InvalidConfig(_))
        ));
        assert!(matches!(
            BudgetPeriod::new("c1", 100.0, at(10), at(10)),
            Err(DecisionError::InvalidRange(_))
        ));
        assert_eq!(november(3000.0).total_days(), 30);
    }

    #[test]
    fn test_on_track() {
        let monitor = PacingMonitor::default();
        let state = monitor.pace(&november(3000.0), 1500.0, at(16));

        assert_eq!(state.days_elapsed, 15);
        assert_eq!(state.days_remaining, 15);
        assert_relative_eq!(state.percent_elapsed, 50.0);
        assert_relative_eq!(state.percent_spent, 50.0);
        assert_eq!(state.status, PacingStatus::OnTrack);
        assert_relative_eq!(state.daily_run_rate, 100.0);
        assert_relative_eq!(state.projected_total_spend, 3000.0);
    }

    #[test]
    fn test_overspending_and_underspending() {
        let monitor = PacingMonitor::default();

        let over = monitor.pace(&november(3000.0), 2400.0, at(16));
        assert_eq!(over.status, PacingStatus::Overspending);
        assert_relative_eq!(over.pacing_percent, 30.0);

        let under = monitor.pace(&november(3000.0), 600.0, at(16));
        assert_eq!(under.status, PacingStatus::Underspending);
    }

    #[test]
    fn test_partial_day_rounds_up() {
        let monitor = PacingMonitor::default();
        let as_of = Utc.with_ymd_and_hms(2025, 11, 1, 6, 0, 0).unwrap();
        let state = monitor.pace(&november(3000.0), 100.0, as_of);

        assert_eq!(state.days_elapsed, 1);
    }

    #[test]
    fn test_sub_second_elapsed_counts_as_a_day() {
        let monitor = PacingMonitor::default();
        let as_of = at(1) + Duration::milliseconds(500);
        let state = monitor.pace(&november(3000.0), 100.0, as_of);

        assert_eq!(state.days_elapsed, 1);
        assert_relative_eq!(state.daily_run_rate, 100.0);
        assert_relative_eq!(state.percent_elapsed, 100.0 / 30.0, epsilon = 1e-9);
    }

    #[test]
    fn test_tolerance_edges_are_on_track() {
        let monitor = PacingMonitor::default();
        let period = november(3000.0);

        // Day 15 of 30: 50% elapsed, so 1800 spent is +10 and 1200 is -10
        let high = monitor.pace(&period, 1800.0, at(16));
        assert_relative_eq!(high.pacing_percent, 10.0, epsilon = 1e-9);
        assert_eq!(high.status, PacingStatus::OnTrack);

        let low = monitor.pace(&period, 1200.0, at(16));
        assert_relative_eq!(low.pacing_percent, -10.0, epsilon = 1e-9);
        assert_eq!(low.status, PacingStatus::OnTrack);
    }

    #[test]
    fn test_before_start() {
        let monitor = PacingMonitor::default();
        let as_of = Utc.with_ymd_and_hms(2025, 10, 25, 0, 0, 0).unwrap();
        let state = monitor.pace(&november(3000.0), 0.0, as_of);

        assert_eq!(state.days_elapsed, 0);
        assert_eq!(state.daily_run_rate, 0.0);
        assert_eq!(state.status, PacingStatus::OnTrack);
    }

    #[test]
    fn test_depleted() {
        let state = calculate_budget_pacing(
            "c1",
            1000.0,
            1200.0,
            at(1),
            Utc.with_ymd_and_hms(2025, 12, 1, 0, 0, 0).unwrap(),
            at(11),
        )
        .unwrap();

        assert_eq!(state.status, PacingStatus::Depleted);
        assert!(state.remaining_budget <= 0.0);
    }

    #[test]
    fn test_attention_list() {
        let monitor = PacingMonitor::default();
        let period = november(3000.0);
        let states = vec![
            monitor.pace(&period, 1500.0, at(16)), // on track
            monitor.pace(&period, 2100.0, at(16)), // +20
            monitor.pace(&period, 3000.0, at(16)), // depleted, +50
            monitor.pace(&period, 300.0, at(16)),  // underspending
        ];

        let flagged = attention_list(&states);

        assert_eq!(flagged.len(), 2);
        assert_eq!(flagged[0].status, PacingStatus::Depleted);
        assert_eq!(flagged[1].status, PacingStatus::Overspending);
    }
}

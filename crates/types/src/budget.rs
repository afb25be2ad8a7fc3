//! Budget allocation and pacing types

use serde::{Deserialize, Serialize};

use crate::campaigns::AdPlatform;

/// Constraints applied when reallocating budget across campaigns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetConstraint {
    /// Total budget to distribute (must be positive)
    pub total_budget: f64,
    /// Minimum budget any single campaign receives
    pub min_budget_per_campaign: Option<f64>,
    /// Minimum combined budget per platform
    pub min_budget_per_platform: Option<f64>,
    /// Maximum combined budget per platform
    pub max_budget_per_platform: Option<f64>,
}

impl BudgetConstraint {
    /// Unconstrained split of `total_budget`
    pub fn new(total_budget: f64) -> Self {
        Self {
            total_budget,
            min_budget_per_campaign: None,
            min_budget_per_platform: None,
            max_budget_per_platform: None,
        }
    }

    pub fn with_min_per_campaign(mut self, min: f64) -> Self {
        self.min_budget_per_campaign = Some(min);
        self
    }

    pub fn with_platform_bounds(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.min_budget_per_platform = min;
        self.max_budget_per_platform = max;
        self
    }
}

/// Recommended budget for one campaign
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignAllocation {
    pub campaign_id: String,
    pub campaign_name: String,
    pub platform: AdPlatform,
    pub roas: f64,
    /// Current spend
    pub current_budget: f64,
    pub recommended_budget: f64,
    /// `recommended_budget - current_budget`
    pub delta: f64,
    /// Delta relative to current, percent (0 when current is 0)
    pub delta_percent: f64,
}

/// Projected effect of a reallocation, assuming constant per-campaign ROAS
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExpectedImpact {
    pub current_roas: f64,
    pub projected_revenue: f64,
    pub projected_roas: f64,
    /// `projected_roas - current_roas`
    pub improvement: f64,
}

/// Result of a budget reallocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetOptimization {
    pub total_budget: f64,
    /// One allocation per input campaign, input order
    pub allocations: Vec<CampaignAllocation>,
    pub expected_impact: ExpectedImpact,
}

impl BudgetOptimization {
    /// Sum of recommended budgets
    pub fn allocated_total(&self) -> f64 {
        self.allocations.iter().map(|a| a.recommended_budget).sum()
    }
}

/// Budget scaling step
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ScalingAction {
    #[serde(rename = "scale_up_50")]
    ScaleUp50,
    #[serde(rename = "scale_up_25")]
    ScaleUp25,
    Maintain,
    #[serde(rename = "scale_down_25")]
    ScaleDown25,
    #[serde(rename = "scale_down_50")]
    ScaleDown50,
}

impl ScalingAction {
    /// Budget change applied by this step, percent
    pub fn change_percent(&self) -> f64 {
        match self {
            ScalingAction::ScaleUp50 => 50.0,
            ScalingAction::ScaleUp25 => 25.0,
            ScalingAction::Maintain => 0.0,
            ScalingAction::ScaleDown25 => -25.0,
            ScalingAction::ScaleDown50 => -50.0,
        }
    }
}

/// Scaling recommendation for a single budget
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScalingRecommendation {
    pub action: ScalingAction,
    pub current_budget: f64,
    pub recommended_budget: f64,
    pub change_percent: f64,
}

/// Projected delivery after a bid change
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BidImpact {
    pub clicks: u64,
    pub conversions: u64,
    pub roas: f64,
}

/// Bid change suggested for one campaign
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BidRecommendation {
    pub campaign_id: String,
    pub campaign_name: String,
    /// Current average cost per click
    pub current_bid: f64,
    pub recommended_bid: f64,
    /// Signed bid change, percent
    pub adjustment_percent: f64,
    /// Rule confidence in `[0, 1]`
    pub confidence: f64,
    pub reasoning: String,
    pub expected_impact: BidImpact,
}

/// Pacing classification
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PacingStatus {
    OnTrack,
    Underspending,
    Overspending,
    Depleted,
}

impl PacingStatus {
    /// Whether the campaign needs a human to look at it
    pub fn needs_attention(&self) -> bool {
        matches!(self, PacingStatus::Overspending | PacingStatus::Depleted)
    }
}

/// Spend pacing snapshot for one budget period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PacingState {
    pub campaign_id: String,
    pub total_budget: f64,
    pub current_spend: f64,
    /// Budget left (negative when overspent)
    pub remaining_budget: f64,
    pub total_days: i64,
    pub days_elapsed: i64,
    pub days_remaining: i64,
    pub percent_elapsed: f64,
    pub percent_spent: f64,
    /// `percent_spent - percent_elapsed`
    pub pacing_percent: f64,
    pub status: PacingStatus,
    pub daily_run_rate: f64,
    pub projected_total_spend: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scaling_action_percent() {
        assert_eq!(ScalingAction::ScaleUp50.change_percent(), 50.0);
        assert_eq!(ScalingAction::ScaleDown25.change_percent(), -25.0);

        let json = serde_json::to_string(&ScalingAction::ScaleUp25).unwrap();
        assert_eq!(json, "\"scale_up_25\"");
    }

    #[test]
    fn test_pacing_attention() {
        assert!(PacingStatus::Depleted.needs_attention());
        assert!(PacingStatus::Overspending.needs_attention());
        assert!(!PacingStatus::Underspending.needs_attention());
    }

    #[test]
    fn test_constraint_builder() {
        let constraint = BudgetConstraint::new(3000.0)
            .with_min_per_campaign(100.0)
            .with_platform_bounds(None, Some(2000.0));

        assert_eq!(constraint.min_budget_per_campaign, Some(100.0));
        assert_eq!(constraint.max_budget_per_platform, Some(2000.0));
    }
}

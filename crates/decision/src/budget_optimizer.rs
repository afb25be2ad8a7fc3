//! ROAS-weighted budget reallocation
//!
//! Splits a total budget across campaigns in proportion to their ROAS, then
//! applies campaign floors and platform bounds. A final renormalization makes
//! the recommended budgets sum to exactly the total, so bounds are targets
//! that can be bent by that last step.
//!
//! [`BidAdvisor`] works one level down, nudging each campaign's bid by how far
//! its ROAS sits from the target.

use std::collections::BTreeMap;

use adsignal_config::{BidConfig, BudgetConfig};
use adsignal_types::{
    AdPlatform, BidImpact, BidRecommendation, BudgetConstraint, BudgetOptimization,
    CampaignAllocation, CampaignSnapshot, ExpectedImpact, ScalingAction, ScalingRecommendation,
};
use tracing::{debug, info, warn};

use crate::errors::{DecisionError, Result};
use crate::performance::{calculate_cpc, calculate_ctr, calculate_roas};

/// Proportional budget allocator
#[derive(Debug, Clone)]
pub struct BudgetAllocator {
    /// Floor used when a constraint sets none
    default_min_per_campaign: Option<f64>,
    /// Target ROAS for scaling recommendations
    target_roas: f64,
}

impl BudgetAllocator {
    /// Create new allocator
    pub fn new(config: &BudgetConfig) -> Result<Self> {
        if config.target_roas <= 0.0 {
            return Err(DecisionError::InvalidConfig(
                "Target ROAS must be positive".to_string(),
            ));
        }

        Ok(Self {
            default_min_per_campaign: config.min_budget_per_campaign,
            target_roas: config.target_roas,
        })
    }

    pub fn target_roas(&self) -> f64 {
        self.target_roas
    }

    /// Reallocate `constraint.total_budget` across `campaigns`
    pub fn optimize(
        &self,
        campaigns: &[CampaignSnapshot],
        constraint: &BudgetConstraint,
    ) -> Result<BudgetOptimization> {
        if campaigns.is_empty() {
            return Err(DecisionError::EmptyCampaignSet);
        }

        let total = constraint.total_budget;
        if total <= 0.0 || !total.is_finite() {
            return Err(DecisionError::InvalidConfig(format!(
                "Total budget must be positive, got {}",
                total
            )));
        }
        validate_bounds(constraint)?;

        let roas: Vec<f64> = campaigns
            .iter()
            .map(|c| calculate_roas(c.revenue, c.ad_spend))
            .collect();
        let total_roas: f64 = roas.iter().sum();

        let mut recommended: Vec<f64> = if total_roas > 0.0 {
            roas.iter().map(|r| total * r / total_roas).collect()
        } else {
            warn!(
                "No campaign has positive ROAS, splitting {:.2} equally across {} campaigns",
                total,
                campaigns.len()
            );
            vec![total / campaigns.len() as f64; campaigns.len()]
        };

        let floor = constraint
            .min_budget_per_campaign
            .or(self.default_min_per_campaign);
        if let Some(min) = floor {
            for budget in recommended.iter_mut() {
                *budget = budget.max(min);
            }
        }

        apply_platform_bounds(campaigns, &mut recommended, constraint);

        let allocated: f64 = recommended.iter().sum();
        if allocated <= 0.0 {
            warn!(
                "Bounds left nothing allocated, splitting {:.2} equally across {} campaigns",
                total,
                campaigns.len()
            );
            recommended = vec![total / campaigns.len() as f64; campaigns.len()];
        } else {
            let factor = total / allocated;
            for budget in recommended.iter_mut() {
                *budget *= factor;
            }

            if let Some(min) = floor {
                if recommended.iter().any(|b| *b < min) {
                    warn!(
                        "Floor of {:.2} per campaign cannot be met with total budget {:.2}; scaled by {:.4}",
                        min, total, factor
                    );
                }
            }
        }

        let allocations: Vec<CampaignAllocation> = campaigns
            .iter()
            .zip(roas.iter())
            .zip(recommended.iter())
            .map(|((campaign, roas), recommended_budget)| {
                let current_budget = campaign.ad_spend;
                let delta = recommended_budget - current_budget;
                let delta_percent = if current_budget != 0.0 {
                    delta / current_budget * 100.0
                } else {
                    0.0
                };

                CampaignAllocation {
                    campaign_id: campaign.id.clone(),
                    campaign_name: campaign.name.clone(),
                    platform: campaign.platform,
                    roas: *roas,
                    current_budget,
                    recommended_budget: *recommended_budget,
                    delta,
                    delta_percent,
                }
            })
            .collect();

        let expected_impact = expected_impact(campaigns, &allocations, total);

        info!(
            "Allocated {:.2} across {} campaigns: roas {:.3} -> {:.3}",
            total,
            allocations.len(),
            expected_impact.current_roas,
            expected_impact.projected_roas
        );

        Ok(BudgetOptimization {
            total_budget: total,
            allocations,
            expected_impact,
        })
    }

    /// Scaling step for a budget against the configured target ROAS
    pub fn recommend(&self, current_budget: f64, current_roas: f64) -> Result<ScalingRecommendation> {
        recommend_scaling(current_budget, current_roas, self.target_roas)
    }
}

impl Default for BudgetAllocator {
    fn default() -> Self {
        Self {
            default_min_per_campaign: None,
            target_roas: 2.0,
        }
    }
}

/// Rule-based bid adjustments
#[derive(Debug, Clone)]
pub struct BidAdvisor {
    config: BidConfig,
    target_roas: f64,
}

impl BidAdvisor {
    /// Create new advisor judging ROAS against `target_roas`
    pub fn new(config: &BidConfig, target_roas: f64) -> Result<Self> {
        if target_roas <= 0.0 {
            return Err(DecisionError::InvalidConfig(
                "Target ROAS must be positive".to_string(),
            ));
        }

        if config.max_adjustment_percent <= 0.0 || config.learning_rate <= 0.0 {
            return Err(DecisionError::InvalidConfig(
                "Bid adjustment limit and learning rate must be positive".to_string(),
            ));
        }

        Ok(Self {
            config: config.clone(),
            target_roas,
        })
    }

    /// Bid change for one campaign, if a rule fires with enough confidence
    pub fn recommend(&self, campaign: &CampaignSnapshot) -> Option<BidRecommendation> {
        let current_bid = calculate_cpc(campaign.ad_spend, campaign.clicks);
        if current_bid <= 0.0 {
            return None;
        }

        let roas = calculate_roas(campaign.revenue, campaign.ad_spend);
        let ctr = calculate_ctr(campaign.clicks, campaign.impressions);
        let target = self.target_roas;
        let max = self.config.max_adjustment_percent;
        let rate = self.config.learning_rate;

        let (adjustment_percent, confidence, reasoning) = if roas > target * 1.5 {
            (
                ((roas - target) * 5.0 * rate).min(max),
                (0.7 + roas / 10.0).min(0.95),
                format!(
                    "ROAS {:.2}x is well above target {:.2}x; raise the bid to buy more volume",
                    roas, target
                ),
            )
        } else if roas > 0.0 && roas < target {
            (
                -((target - roas) * 10.0 * rate).min(max),
                (0.6 + (target - roas) / 5.0).min(0.9),
                format!(
                    "ROAS {:.2}x is below target {:.2}x; lower the bid to recover efficiency",
                    roas, target
                ),
            )
        } else if ctr > self.config.min_ctr * 1.5 && campaign.conversions < 10 {
            (
                -5.0,
                0.75,
                format!(
                    "CTR {:.2}% is strong but only {} conversions; trim the bid and review targeting",
                    ctr, campaign.conversions
                ),
            )
        } else {
            return None;
        };

        if adjustment_percent == 0.0 || confidence < self.config.min_confidence {
            debug!(
                "No bid change for {}: adjustment {:.2}%, confidence {:.2}",
                campaign.id, adjustment_percent, confidence
            );
            return None;
        }

        let clicks_factor = if adjustment_percent > 0.0 { 1.2 } else { 0.9 };
        let roas_factor = if adjustment_percent > 0.0 { 1.1 } else { 1.15 };
        let conversions =
            campaign.conversions as f64 * (1.0 + adjustment_percent / 100.0 * 0.5);

        Some(BidRecommendation {
            campaign_id: campaign.id.clone(),
            campaign_name: campaign.name.clone(),
            current_bid,
            recommended_bid: current_bid * (1.0 + adjustment_percent / 100.0),
            adjustment_percent,
            confidence,
            reasoning,
            expected_impact: BidImpact {
                clicks: (campaign.clicks as f64 * clicks_factor).round() as u64,
                conversions: conversions.round() as u64,
                roas: roas * roas_factor,
            },
        })
    }

    /// Bid changes across campaigns, most confident first
    pub fn recommend_all(&self, campaigns: &[CampaignSnapshot]) -> Vec<BidRecommendation> {
        let mut recommendations: Vec<BidRecommendation> =
            campaigns.iter().filter_map(|c| self.recommend(c)).collect();

        recommendations.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

        if !recommendations.is_empty() {
            info!(
                "Recommended bid changes for {} of {} campaigns",
                recommendations.len(),
                campaigns.len()
            );
        }

        recommendations
    }
}

impl Default for BidAdvisor {
    fn default() -> Self {
        Self {
            config: BidConfig::default(),
            target_roas: 2.0,
        }
    }
}

fn validate_bounds(constraint: &BudgetConstraint) -> Result<()> {
    let floors = [
        ("min_budget_per_campaign", constraint.min_budget_per_campaign),
        ("min_budget_per_platform", constraint.min_budget_per_platform),
    ];
    for (name, value) in floors {
        if let Some(min) = value {
            if min < 0.0 || !min.is_finite() {
                return Err(DecisionError::InvalidConfig(format!(
                    "{} must be non-negative, got {}",
                    name, min
                )));
            }
        }
    }

    if let Some(max) = constraint.max_budget_per_platform {
        if max <= 0.0 || max.is_nan() {
            return Err(DecisionError::InvalidConfig(format!(
                "max_budget_per_platform must be positive, got {}",
                max
            )));
        }
        if let Some(min) = constraint.min_budget_per_platform {
            if min > max {
                return Err(DecisionError::InvalidConfig(format!(
                    "min_budget_per_platform {} exceeds max_budget_per_platform {}",
                    min, max
                )));
            }
        }
    }

    Ok(())
}

fn apply_platform_bounds(
    campaigns: &[CampaignSnapshot],
    recommended: &mut [f64],
    constraint: &BudgetConstraint,
) {
    if constraint.min_budget_per_platform.is_none() && constraint.max_budget_per_platform.is_none() {
        return;
    }

    let mut by_platform: BTreeMap<AdPlatform, Vec<usize>> = BTreeMap::new();
    for (i, campaign) in campaigns.iter().enumerate() {
        by_platform.entry(campaign.platform).or_default().push(i);
    }

    for (platform, indices) in by_platform {
        let platform_total: f64 = indices.iter().map(|i| recommended[*i]).sum();

        let target = match (constraint.min_budget_per_platform, constraint.max_budget_per_platform) {
            (Some(min), _) if platform_total < min => min,
            (_, Some(max)) if platform_total > max => max,
            _ => continue,
        };

        debug!(
            "Scaling {} budget from {:.2} to {:.2}",
            platform, platform_total, target
        );

        if platform_total > 0.0 {
            let factor = target / platform_total;
            for i in &indices {
                recommended[*i] *= factor;
            }
        } else {
            let share = target / indices.len() as f64;
            for i in &indices {
                recommended[*i] = share;
            }
        }
    }
}

fn expected_impact(
    campaigns: &[CampaignSnapshot],
    allocations: &[CampaignAllocation],
    total: f64,
) -> ExpectedImpact {
    let current_spend: f64 = campaigns.iter().map(|c| c.ad_spend).sum();
    let current_revenue: f64 = campaigns.iter().map(|c| c.revenue).sum();
    let current_roas = calculate_roas(current_revenue, current_spend);

    let projected_revenue: f64 = allocations
        .iter()
        .map(|a| a.recommended_budget * a.roas)
        .sum();
    let projected_roas = projected_revenue / total;

    ExpectedImpact {
        current_roas,
        projected_revenue,
        projected_roas,
        improvement: projected_roas - current_roas,
    }
}

/// Scaling step for a budget given current and target ROAS
pub fn recommend_scaling(
    current_budget: f64,
    current_roas: f64,
    target_roas: f64,
) -> Result<ScalingRecommendation> {
    if target_roas <= 0.0 {
        return Err(DecisionError::InvalidRange(format!(
            "target ROAS must be positive, got {}",
            target_roas
        )));
    }

    let action = if current_roas >= 1.5 * target_roas {
        ScalingAction::ScaleUp50
    } else if current_roas >= target_roas {
        ScalingAction::ScaleUp25
    } else if current_roas >= 0.75 * target_roas {
        ScalingAction::Maintain
    } else if current_roas >= 0.5 * target_roas {
        ScalingAction::ScaleDown25
    } else {
        ScalingAction::ScaleDown50
    };

    let change_percent = action.change_percent();

    Ok(ScalingRecommendation {
        action,
        current_budget,
        recommended_budget: current_budget * (1.0 + change_percent / 100.0),
        change_percent,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn campaign(id: &str, platform: AdPlatform, spend: f64, revenue: f64) -> CampaignSnapshot {
        let start = NaiveDate::from_ymd_opt(2025, 10, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2025, 10, 31).unwrap();
        CampaignSnapshot::new(id, id, platform, spend, revenue, start, end)
    }

    fn portfolio() -> Vec<CampaignSnapshot> {
        vec![
            campaign("a", AdPlatform::Meta, 1000.0, 4000.0),   // roas 4
            campaign("b", AdPlatform::Google, 1000.0, 2000.0), // roas 2
            campaign("c", AdPlatform::Tiktok, 1000.0, 0.0),    // roas 0
        ]
    }

    #[test]
    fn test_proportional_split() {
        let allocator = BudgetAllocator::default();
        let result = allocator
            .optimize(&portfolio(), &BudgetConstraint::new(3000.0))
            .unwrap();

        assert_relative_eq!(result.allocations[0].recommended_budget, 2000.0, epsilon = 1e-9);
        assert_relative_eq!(result.allocations[1].recommended_budget, 1000.0, epsilon = 1e-9);
        assert_relative_eq!(result.allocations[2].recommended_budget, 0.0, epsilon = 1e-9);
        assert_relative_eq!(result.allocations[0].delta, 1000.0, epsilon = 1e-9);
        assert_relative_eq!(result.allocations[0].delta_percent, 100.0, epsilon = 1e-9);
        assert_relative_eq!(result.allocations[2].delta_percent, -100.0, epsilon = 1e-9);
    }

    #[test]
    fn test_sum_matches_total_with_high_floor() {
        let allocator = BudgetAllocator::default();
        let constraint = BudgetConstraint::new(3000.0).with_min_per_campaign(1500.0);
        let result = allocator.optimize(&portfolio(), &constraint).unwrap();

        assert!((result.allocated_total() - 3000.0).abs() < 0.01);
    }

    #[test]
    fn test_floor_lifts_zero_roas_campaign() {
        let allocator = BudgetAllocator::default();
        let constraint = BudgetConstraint::new(3000.0).with_min_per_campaign(300.0);
        let result = allocator.optimize(&portfolio(), &constraint).unwrap();

        assert!(result.allocations[2].recommended_budget > 0.0);
        assert!((result.allocated_total() - 3000.0).abs() < 1e-6);
    }

    #[test]
    fn test_equal_split_when_no_roas() {
        let allocator = BudgetAllocator::default();
        let campaigns = vec![
            campaign("a", AdPlatform::Meta, 100.0, 0.0),
            campaign("b", AdPlatform::Meta, 0.0, 0.0),
        ];
        let result = allocator
            .optimize(&campaigns, &BudgetConstraint::new(1000.0))
            .unwrap();

        assert_relative_eq!(result.allocations[0].recommended_budget, 500.0);
        assert_relative_eq!(result.allocations[1].recommended_budget, 500.0);
        // Zero current budget reports zero percent change
        assert_eq!(result.allocations[1].delta_percent, 0.0);
    }

    #[test]
    fn test_platform_cap() {
        let allocator = BudgetAllocator::default();
        let constraint = BudgetConstraint::new(3000.0).with_platform_bounds(None, Some(1500.0));
        let result = allocator.optimize(&portfolio(), &constraint).unwrap();

        // Meta capped at 1500, then everything renormalized to 3000
        let meta = result.allocations[0].recommended_budget;
        let google = result.allocations[1].recommended_budget;
        assert_relative_eq!(meta / google, 1.5, epsilon = 1e-9);
        assert!((result.allocated_total() - 3000.0).abs() < 1e-6);
    }

    #[test]
    fn test_invalid_bounds_rejected() {
        let allocator = BudgetAllocator::default();
        let invalid = [
            BudgetConstraint::new(3000.0).with_platform_bounds(None, Some(0.0)),
            BudgetConstraint::new(3000.0).with_platform_bounds(Some(-10.0), None),
            BudgetConstraint::new(3000.0).with_platform_bounds(Some(2000.0), Some(1000.0)),
            BudgetConstraint::new(3000.0).with_min_per_campaign(-1.0),
        ];

        for constraint in &invalid {
            assert!(matches!(
                allocator.optimize(&portfolio(), constraint),
                Err(DecisionError::InvalidConfig(_))
            ));
        }
    }

    #[test]
    fn test_tiny_cap_still_allocates_total() {
        let allocator = BudgetAllocator::default();
        let campaigns = vec![
            campaign("a", AdPlatform::Meta, 1000.0, 3000.0),
            campaign("b", AdPlatform::Meta, 1000.0, 1000.0),
        ];
        let constraint = BudgetConstraint::new(3000.0).with_platform_bounds(None, Some(1e-9));
        let result = allocator.optimize(&campaigns, &constraint).unwrap();

        assert!((result.allocated_total() - 3000.0).abs() < 1e-6);
        assert_relative_eq!(result.allocations[0].recommended_budget, 2250.0, epsilon = 1e-6);
    }

    #[test]
    fn test_expected_impact() {
        let allocator = BudgetAllocator::default();
        let result = allocator
            .optimize(&portfolio(), &BudgetConstraint::new(3000.0))
            .unwrap();
        let impact = result.expected_impact;

        assert_relative_eq!(impact.current_roas, 2.0);
        assert_relative_eq!(impact.projected_revenue, 10_000.0, epsilon = 1e-6);
        assert_relative_eq!(impact.projected_roas, 10_000.0 / 3000.0, epsilon = 1e-9);
        assert!(impact.improvement > 0.0);
    }

    #[test]
    fn test_errors() {
        let allocator = BudgetAllocator::default();

        assert!(matches!(
            allocator.optimize(&[], &BudgetConstraint::new(1000.0)),
            Err(DecisionError::EmptyCampaignSet)
        ));
        assert!(matches!(
            allocator.optimize(&portfolio(), &BudgetConstraint::new(0.0)),
            Err(DecisionError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_scaling_bands() {
        let cases = [
            (6.0, ScalingAction::ScaleUp50),
            (4.0, ScalingAction::ScaleUp25),
            (3.0, ScalingAction::Maintain),
            (2.0, ScalingAction::ScaleDown25),
            (1.0, ScalingAction::ScaleDown50),
        ];

        for (roas, expected) in cases {
            let rec = recommend_scaling(1000.0, roas, 4.0).unwrap();
            assert_eq!(rec.action, expected, "roas {}", roas);
        }

        let rec = recommend_scaling(1000.0, 6.0, 4.0).unwrap();
        assert_relative_eq!(rec.recommended_budget, 1500.0);
        assert_eq!(rec.change_percent, 50.0);
    }

    #[test]
    fn test_scaling_band_edges_with_inexact_target() {
        let target = 0.39;
        let cases = [
            (1.5 * target, ScalingAction::ScaleUp50),
            (target, ScalingAction::ScaleUp25),
            (0.75 * target, ScalingAction::Maintain),
            (0.5 * target, ScalingAction::ScaleDown25),
        ];

        for (roas, expected) in cases {
            let rec = recommend_scaling(1000.0, roas, target).unwrap();
            assert_eq!(rec.action, expected, "roas {}", roas);
        }

        for step in 1..2000 {
            let target = step as f64 / 100.0;
            let rec = recommend_scaling(1000.0, 1.5 * target, target).unwrap();
            assert_eq!(rec.action, ScalingAction::ScaleUp50, "target {}", target);
            let rec = recommend_scaling(1000.0, 0.75 * target, target).unwrap();
            assert_eq!(rec.action, ScalingAction::Maintain, "target {}", target);
        }
    }

    fn delivering(id: &str, spend: f64, revenue: f64, clicks: u64, conversions: u64) -> CampaignSnapshot {
        campaign(id, AdPlatform::Google, spend, revenue).with_delivery(100_000, clicks, conversions)
    }

    #[test]
    fn test_bid_raise_for_strong_roas() {
        let advisor = BidAdvisor::default();
        // roas 5, cpc 2.0
        let rec = advisor
            .recommend(&delivering("strong", 1000.0, 5000.0, 500, 50))
            .unwrap();

        assert_relative_eq!(rec.current_bid, 2.0);
        assert_relative_eq!(rec.adjustment_percent, 7.5, epsilon = 1e-9);
        assert_relative_eq!(rec.recommended_bid, 2.15, epsilon = 1e-9);
        assert_relative_eq!(rec.confidence, 0.95);
        assert_eq!(rec.expected_impact.clicks, 600);
        assert_eq!(rec.expected_impact.conversions, 52);
        assert_relative_eq!(rec.expected_impact.roas, 5.5, epsilon = 1e-9);
    }

    #[test]
    fn test_bid_raise_is_capped() {
        let advisor = BidAdvisor::default();
        let rec = advisor
            .recommend(&delivering("outlier", 100.0, 2000.0, 50, 20))
            .unwrap();

        assert_eq!(rec.adjustment_percent, 20.0);
    }

    #[test]
    fn test_bid_cut_for_weak_roas() {
        let advisor = BidAdvisor::default();
        // roas 1, cpc 2.0
        let rec = advisor
            .recommend(&delivering("weak", 1000.0, 1000.0, 500, 40))
            .unwrap();

        assert_relative_eq!(rec.adjustment_percent, -5.0, epsilon = 1e-9);
        assert_relative_eq!(rec.recommended_bid, 1.9, epsilon = 1e-9);
        assert_relative_eq!(rec.confidence, 0.8, epsilon = 1e-9);
        assert_eq!(rec.expected_impact.clicks, 450);
    }

    #[test]
    fn test_low_confidence_is_dropped() {
        let advisor = BidAdvisor::default();

        // roas 1.8: confidence 0.64 falls under the 0.7 gate
        assert!(advisor.recommend(&delivering("near", 1000.0, 1800.0, 500, 40)).is_none());
        // no clicks, no bid to adjust
        assert!(advisor.recommend(&delivering("dark", 1000.0, 500.0, 0, 0)).is_none());
        // zero ROAS matches no rule at normal CTR
        assert!(advisor.recommend(&delivering("dead", 1000.0, 0.0, 500, 0)).is_none());
    }

    #[test]
    fn test_bid_recommendations_sorted_by_confidence() {
        let advisor = BidAdvisor::default();
        let campaigns = vec![
            // roas 2.5, CTR 4% with few conversions
            campaign("clicky", AdPlatform::Meta, 1000.0, 2500.0).with_delivery(10_000, 400, 5),
            delivering("weak", 1000.0, 1000.0, 500, 40),
            delivering("steady", 1000.0, 2500.0, 500, 40),
            delivering("strong", 1000.0, 5000.0, 500, 50),
        ];

        let recs = advisor.recommend_all(&campaigns);
        let ids: Vec<&str> = recs.iter().map(|r| r.campaign_id.as_str()).collect();

        assert_eq!(ids, vec!["strong", "weak", "clicky"]);
        assert_eq!(recs[2].adjustment_percent, -5.0);
    }

    #[test]
    fn test_bid_advisor_validation() {
        assert!(BidAdvisor::new(&BidConfig::default(), 0.0).is_err());

        let config = BidConfig {
            learning_rate: 0.0,
            ..BidConfig::default()
        };
        assert!(BidAdvisor::new(&config, 2.0).is_err());
    }

    #[test]
    fn test_scaling_invalid_target() {
        assert!(matches!(
            recommend_scaling(1000.0, 2.0, 0.0),
            Err(DecisionError::InvalidRange(_))
        ));
    }
}

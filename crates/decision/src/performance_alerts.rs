//! Threshold alerts on campaign performance

use adsignal_config::AlertThresholds;
use adsignal_types::{
    AlertAction, AnomalySeverity, CampaignSnapshot, PerformanceAlert, PerformanceAlertType,
    PerformanceMetrics,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::performance::campaign_performance;

/// Alerts raised for one underperforming campaign
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignCheck {
    pub campaign_id: String,
    pub campaign_name: String,
    pub metrics: PerformanceMetrics,
    pub alerts: Vec<PerformanceAlert>,
}

/// Campaign performance checker
#[derive(Debug, Clone, Default)]
pub struct PerformanceAlertChecker {
    thresholds: AlertThresholds,
}

impl PerformanceAlertChecker {
    pub fn new(thresholds: &AlertThresholds) -> Self {
        Self {
            thresholds: thresholds.clone(),
        }
    }

    pub fn thresholds(&self) -> &AlertThresholds {
        &self.thresholds
    }

    /// Alerts for a single campaign, empty when it is healthy
    pub fn check_campaign(&self, campaign: &CampaignSnapshot) -> Vec<PerformanceAlert> {
        let t = &self.thresholds;
        let metrics = campaign_performance(campaign);
        let mut alerts = Vec::new();

        if campaign.ad_spend > 0.0 && metrics.roas < t.min_roas {
            let unprofitable = metrics.roas < 1.0;
            alerts.push(PerformanceAlert {
                campaign_id: campaign.id.clone(),
                alert_type: PerformanceAlertType::LowRoas,
                current_value: Some(metrics.roas),
                threshold_value: t.min_roas,
                severity: if unprofitable {
                    AnomalySeverity::Critical
                } else {
                    AnomalySeverity::Warning
                },
                action: if unprofitable {
                    AlertAction::Pause
                } else {
                    AlertAction::Optimize
                },
                message: format!(
                    "Campaign \"{}\" has ROAS of {:.2}x, below target of {:.2}x. {}",
                    campaign.name,
                    metrics.roas,
                    t.min_roas,
                    if unprofitable {
                        "Campaign is unprofitable."
                    } else {
                        "Campaign profitability is at risk."
                    }
                ),
                recommendation: if unprofitable {
                    "Pause the campaign and review targeting, creative and audience before relaunching."
                } else {
                    "Test new audiences, ad copy and bidding strategies; monitor closely for 48 hours."
                }
                .to_string(),
            });
        }

        if campaign.conversions < t.min_conversions
            && campaign.ad_spend > t.min_spend_for_conversion_check
        {
            alerts.push(PerformanceAlert {
                campaign_id: campaign.id.clone(),
                alert_type: PerformanceAlertType::NoConversions,
                current_value: Some(campaign.conversions as f64),
                threshold_value: t.min_conversions as f64,
                severity: AnomalySeverity::Warning,
                action: AlertAction::Monitor,
                message: format!(
                    "Campaign \"{}\" has {} conversion(s) with spend of {:.2}. Conversion tracking may be broken or targeting is ineffective.",
                    campaign.name, campaign.conversions, campaign.ad_spend
                ),
                recommendation: "Verify pixel installation and the checkout flow, then review targeting."
                    .to_string(),
            });
        }

        if campaign.impressions > t.min_impressions_for_ctr && metrics.ctr < t.min_ctr {
            alerts.push(PerformanceAlert {
                campaign_id: campaign.id.clone(),
                alert_type: PerformanceAlertType::LowCtr,
                current_value: Some(metrics.ctr),
                threshold_value: t.min_ctr,
                severity: AnomalySeverity::Warning,
                action: AlertAction::Optimize,
                message: format!(
                    "Campaign \"{}\" has CTR of {:.2}%, below target of {:.2}%. Ad creative may not be engaging.",
                    campaign.name, metrics.ctr, t.min_ctr
                ),
                recommendation: "Refresh images, headlines and copy; A/B test ad formats.".to_string(),
            });
        }

        if let Some(max_cpa) = t.max_cpa {
            if campaign.conversions > 0 && metrics.cpa > max_cpa {
                alerts.push(PerformanceAlert {
                    campaign_id: campaign.id.clone(),
                    alert_type: PerformanceAlertType::HighCpa,
                    current_value: Some(metrics.cpa),
                    threshold_value: max_cpa,
                    severity: AnomalySeverity::Warning,
                    action: AlertAction::ScaleDown,
                    message: format!(
                        "Campaign \"{}\" has CPA of {:.2}, above target of {:.2}.",
                        campaign.name, metrics.cpa, max_cpa
                    ),
                    recommendation: "Reduce budget or tighten targeting to bring acquisition cost down."
                        .to_string(),
                });
            }
        }

        if !alerts.is_empty() {
            debug!("Campaign {} raised {} alerts", campaign.id, alerts.len());
        }

        alerts
    }

    /// Check many campaigns, keeping only those with alerts
    pub fn check_campaigns(&self, campaigns: &[CampaignSnapshot]) -> Vec<CampaignCheck> {
        campaigns
            .iter()
            .filter_map(|campaign| {
                let alerts = self.check_campaign(campaign);
                if alerts.is_empty() {
                    return None;
                }
                Some(CampaignCheck {
                    campaign_id: campaign.id.clone(),
                    campaign_name: campaign.name.clone(),
                    metrics: campaign_performance(campaign),
                    alerts,
                })
            })
            .collect()
    }
}

//! Campaign performance metrics
//!
//! Ratio helpers (ROAS, CPC, CPM, CPA, CTR, conversion rate) and cross-campaign
//! aggregation. Every ratio falls back to `0.0` when its denominator is zero;
//! aggregates are computed as ratios of sums, never as averages of ratios.

use adsignal_types::{
    AdPlatform, AggregatedPerformance, CampaignSnapshot, PerformanceMetrics, PlatformPerformance,
};
use tracing::debug;

use crate::errors::{DecisionError, Result};

/// Return on ad spend
///
/// `0.0` when nothing was spent. Negative revenue (refund-heavy periods) is
/// floored so ROAS is never negative.
pub fn calculate_roas(revenue: f64, ad_spend: f64) -> f64 {
    if ad_spend <= 0.0 {
        return 0.0;
    }
    revenue.max(0.0) / ad_spend
}

/// Return on ad spend, rejecting non-positive spend
pub fn calculate_roas_strict(revenue: f64, ad_spend: f64) -> Result<f64> {
    if ad_spend <= 0.0 {
        return Err(DecisionError::InvalidRange(format!(
            "ad spend must be positive to compute ROAS, got {}",
            ad_spend
        )));
    }
    Ok(revenue.max(0.0) / ad_spend)
}

/// Cost per click
pub fn calculate_cpc(ad_spend: f64, clicks: u64) -> f64 {
    if clicks == 0 {
        return 0.0;
    }
    ad_spend / clicks as f64
}

/// Cost per thousand impressions
pub fn calculate_cpm(ad_spend: f64, impressions: u64) -> f64 {
    if impressions == 0 {
        return 0.0;
    }
    ad_spend / impressions as f64 * 1000.0
}

/// Cost per acquisition
pub fn calculate_cpa(ad_spend: f64, conversions: u64) -> f64 {
    if conversions == 0 {
        return 0.0;
    }
    ad_spend / conversions as f64
}

/// Click-through rate, percent
pub fn calculate_ctr(clicks: u64, impressions: u64) -> f64 {
    if impressions == 0 {
        return 0.0;
    }
    clicks as f64 / impressions as f64 * 100.0
}

/// Conversions per click, percent
pub fn calculate_conversion_rate(conversions: u64, clicks: u64) -> f64 {
    if clicks == 0 {
        return 0.0;
    }
    conversions as f64 / clicks as f64 * 100.0
}

/// Incremental ROAS of a test period over a baseline
///
/// `0.0` when the test did not spend more than the baseline.
pub fn incremental_roas(baseline: &CampaignSnapshot, test: &CampaignSnapshot) -> f64 {
    let incremental_spend = test.ad_spend - baseline.ad_spend;
    if incremental_spend <= 0.0 {
        return 0.0;
    }
    (test.revenue - baseline.revenue) / incremental_spend
}

fn metrics_from_totals(
    ad_spend: f64,
    revenue: f64,
    impressions: u64,
    clicks: u64,
    conversions: u64,
) -> PerformanceMetrics {
    PerformanceMetrics {
        roas: calculate_roas(revenue, ad_spend),
        cpc: calculate_cpc(ad_spend, clicks),
        cpm: calculate_cpm(ad_spend, impressions),
        cpa: calculate_cpa(ad_spend, conversions),
        ctr: calculate_ctr(clicks, impressions),
        conversion_rate: calculate_conversion_rate(conversions, clicks),
    }
}

/// Derived metrics of a single campaign
pub fn campaign_performance(campaign: &CampaignSnapshot) -> PerformanceMetrics {
    metrics_from_totals(
        campaign.ad_spend,
        campaign.revenue,
        campaign.impressions,
        campaign.clicks,
        campaign.conversions,
    )
}

#[derive(Default)]
struct Totals {
    campaigns: usize,
    ad_spend: f64,
    revenue: f64,
    impressions: u64,
    clicks: u64,
    conversions: u64,
}

impl Totals {
    fn add(&mut self, campaign: &CampaignSnapshot) {
        self.campaigns += 1;
        self.ad_spend += campaign.ad_spend;
        self.revenue += campaign.revenue;
        self.impressions += campaign.impressions;
        self.clicks += campaign.clicks;
        self.conversions += campaign.conversions;
    }

    fn metrics(&self) -> PerformanceMetrics {
        metrics_from_totals(
            self.ad_spend,
            self.revenue,
            self.impressions,
            self.clicks,
            self.conversions,
        )
    }
}

/// Aggregate performance across campaigns
pub fn aggregate_campaign_performance(
    campaigns: &[CampaignSnapshot],
) -> Result<AggregatedPerformance> {
    let (first, rest) = campaigns.split_first().ok_or(DecisionError::EmptyCampaignSet)?;

    let mut totals = Totals::default();
    let mut period_start = first.period_start;
    let mut period_end = first.period_end;

    for campaign in campaigns {
        totals.add(campaign);
    }
    for campaign in rest {
        period_start = period_start.min(campaign.period_start);
        period_end = period_end.max(campaign.period_end);
    }

    let by_platform: Vec<PlatformPerformance> = AdPlatform::ALL
        .iter()
        .filter_map(|platform| {
            let mut platform_totals = Totals::default();
            for campaign in campaigns.iter().filter(|c| c.platform == *platform) {
                platform_totals.add(campaign);
            }

            if platform_totals.campaigns == 0 {
                return None;
            }

            Some(PlatformPerformance {
                platform: *platform,
                campaigns: platform_totals.campaigns,
                ad_spend: platform_totals.ad_spend,
                revenue: platform_totals.revenue,
                metrics: platform_totals.metrics(),
            })
        })
        .collect();

    let metrics = totals.metrics();

    debug!(
        "Aggregated {} campaigns across {} platforms: spend={:.2}, revenue={:.2}, roas={:.3}",
        totals.campaigns,
        by_platform.len(),
        totals.ad_spend,
        totals.revenue,
        metrics.roas
    );

    Ok(AggregatedPerformance {
        total_campaigns: totals.campaigns,
        total_ad_spend: totals.ad_spend,
        total_revenue: totals.revenue,
        total_impressions: totals.impressions,
        total_clicks: totals.clicks,
        total_conversions: totals.conversions,
        aggregated_roas: metrics.roas,
        average_cpc: metrics.cpc,
        average_cpm: metrics.cpm,
        average_cpa: metrics.cpa,
        aggregated_ctr: metrics.ctr,
        aggregated_conversion_rate: metrics.conversion_rate,
        by_platform,
        period_start,
        period_end,
    })
}

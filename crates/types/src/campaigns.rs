//! Campaign snapshots and derived performance views

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Advertising platform a campaign runs on
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum AdPlatform {
    Meta,
    Google,
    Tiktok,
    Other,
}

impl AdPlatform {
    /// Platforms in reporting order
    pub const ALL: [AdPlatform; 4] = [
        AdPlatform::Meta,
        AdPlatform::Google,
        AdPlatform::Tiktok,
        AdPlatform::Other,
    ];
}

impl fmt::Display for AdPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AdPlatform::Meta => "meta",
            AdPlatform::Google => "google",
            AdPlatform::Tiktok => "tiktok",
            AdPlatform::Other => "other",
        };
        f.write_str(name)
    }
}

/// Campaign delivery status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CampaignStatus {
    Active,
    Paused,
    Completed,
    Draft,
}

/// Raw campaign totals for one reporting period
///
/// Derived metrics (ROAS, CTR, ...) are never stored here; compute them with
/// `decision::performance`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignSnapshot {
    /// Campaign identifier
    pub id: String,
    /// Campaign name
    pub name: String,
    /// Advertising platform
    pub platform: AdPlatform,
    /// Campaign status
    pub status: CampaignStatus,
    /// Total ad spend in account currency
    pub ad_spend: f64,
    /// Attributed revenue in account currency
    pub revenue: f64,
    /// Ad impressions
    pub impressions: u64,
    /// Clicks
    pub clicks: u64,
    /// Conversions (purchases, signups, ...)
    pub conversions: u64,
    /// First day of the reporting period
    pub period_start: NaiveDate,
    /// Last day of the reporting period
    pub period_end: NaiveDate,
}

impl CampaignSnapshot {
    /// Create an active campaign snapshot with zeroed delivery counts
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        platform: AdPlatform,
        ad_spend: f64,
        revenue: f64,
        period_start: NaiveDate,
        period_end: NaiveDate,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            platform,
            status: CampaignStatus::Active,
            ad_spend,
            revenue,
            impressions: 0,
            clicks: 0,
            conversions: 0,
            period_start,
            period_end,
        }
    }

    /// Set delivery counts
    pub fn with_delivery(mut self, impressions: u64, clicks: u64, conversions: u64) -> Self {
        self.impressions = impressions;
        self.clicks = clicks;
        self.conversions = conversions;
        self
    }

    /// Set status
    pub fn with_status(mut self, status: CampaignStatus) -> Self {
        self.status = status;
        self
    }
}

/// Derived performance view of a campaign or aggregate
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    /// Return on ad spend (revenue / spend)
    pub roas: f64,
    /// Cost per click
    pub cpc: f64,
    /// Cost per thousand impressions
    pub cpm: f64,
    /// Cost per acquisition
    pub cpa: f64,
    /// Click-through rate, percent
    pub ctr: f64,
    /// Conversions per click, percent
    pub conversion_rate: f64,
}

/// Per-platform slice of an aggregation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformPerformance {
    pub platform: AdPlatform,
    /// Number of campaigns on the platform
    pub campaigns: usize,
    pub ad_spend: f64,
    pub revenue: f64,
    pub metrics: PerformanceMetrics,
}

/// Performance aggregated across campaigns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedPerformance {
    pub total_campaigns: usize,
    pub total_ad_spend: f64,
    pub total_revenue: f64,
    pub total_impressions: u64,
    pub total_clicks: u64,
    pub total_conversions: u64,
    pub aggregated_roas: f64,
    pub average_cpc: f64,
    pub average_cpm: f64,
    pub average_cpa: f64,
    pub aggregated_ctr: f64,
    pub aggregated_conversion_rate: f64,
    /// Platforms present in the input, in `AdPlatform::ALL` order
    pub by_platform: Vec<PlatformPerformance>,
    /// Earliest period start across campaigns
    pub period_start: NaiveDate,
    /// Latest period end across campaigns
    pub period_end: NaiveDate,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 10, d).unwrap()
    }

    #[test]
    fn test_snapshot_builder() {
        let snapshot = CampaignSnapshot::new("c1", "Summer Sale", AdPlatform::Meta, 500.0, 2000.0, day(1), day(15))
            .with_delivery(50_000, 500, 40)
            .with_status(CampaignStatus::Paused);

        assert_eq!(snapshot.clicks, 500);
        assert_eq!(snapshot.status, CampaignStatus::Paused);
    }

    #[test]
    fn test_platform_serialization() {
        let json = serde_json::to_string(&AdPlatform::Tiktok).unwrap();
        assert_eq!(json, "\"tiktok\"");
        assert_eq!(AdPlatform::Google.to_string(), "google");
    }
}

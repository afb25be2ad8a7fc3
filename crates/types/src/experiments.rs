//! A/B testing types

use serde::{Deserialize, Serialize};

/// Status of an A/B comparison
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TestStatus {
    /// Still collecting data
    Running,
    /// Significant result with a declared winner
    Complete,
    /// Enough data, no significant difference
    Inconclusive,
}

/// Raw delivery totals for one variant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantResult {
    /// Variant identifier (e.g., "control", "variant_a")
    pub variant_id: String,
    pub impressions: u64,
    pub clicks: u64,
    pub conversions: u64,
    pub ad_spend: f64,
    pub revenue: f64,
}

impl VariantResult {
    /// Create a new variant result
    pub fn new(
        variant_id: impl Into<String>,
        impressions: u64,
        clicks: u64,
        conversions: u64,
        ad_spend: f64,
        revenue: f64,
    ) -> Self {
        Self {
            variant_id: variant_id.into(),
            impressions,
            clicks,
            conversions,
            ad_spend,
            revenue,
        }
    }

    /// Sample size used for gating (impressions)
    pub fn sample_size(&self) -> u64 {
        self.impressions
    }

    /// Conversions per impression
    pub fn conversion_proportion(&self) -> f64 {
        if self.impressions > 0 {
            self.conversions as f64 / self.impressions as f64
        } else {
            0.0
        }
    }
}

/// Derived metrics for one variant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantMetrics {
    pub variant_id: String,
    pub ctr: f64,
    pub cpc: f64,
    pub cpa: f64,
    pub roas: f64,
    pub conversion_rate: f64,
    pub sample_size: u64,
}

/// Verdict of comparing two or more variants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ABTestVerdict {
    /// Winning variant (only when complete)
    pub winner: Option<String>,
    pub is_significant: bool,
    /// Two-tailed p-value
    pub p_value: f64,
    pub z_score: f64,
    /// Relative lift of the challenger over control, percent
    pub lift_percent: f64,
    pub confidence_level: f64,
    pub status: TestStatus,
    /// Derived metrics per variant, input order
    pub variants: Vec<VariantMetrics>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_conversion_proportion() {
        let variant = VariantResult::new("control", 1000, 50, 25, 100.0, 400.0);

        assert_eq!(variant.sample_size(), 1000);
        assert_eq!(variant.conversion_proportion(), 0.025);
    }

    #[test]
    fn test_empty_variant_proportion() {
        let variant = VariantResult::new("empty", 0, 0, 0, 0.0, 0.0);
        assert_eq!(variant.conversion_proportion(), 0.0);
    }
}

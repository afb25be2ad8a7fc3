//! A/B test verdicts
//!
//! Compares creative or audience variants on conversion rate with a
//! two-proportion z-test, gated on a minimum sample size per variant.

use adsignal_config::EngineConfig;
use adsignal_types::{ABTestVerdict, TestStatus, VariantMetrics, VariantResult};
use tracing::{debug, info};

use crate::{
    errors::{DecisionError, Result},
    performance::{calculate_conversion_rate, calculate_cpa, calculate_cpc, calculate_ctr, calculate_roas},
    statistical::{required_sample_size, z_critical, StatisticalTest, ZTest},
};

/// Significance tester for ad variants
#[derive(Debug, Clone)]
pub struct SignificanceTester {
    /// Two-tailed confidence level
    confidence_level: f64,
    /// Statistical power for sample size planning
    power: f64,
    /// Impressions each variant needs before a verdict
    min_sample_size: u64,
}

impl SignificanceTester {
    /// Create a new tester from engine configuration
    pub fn new(config: &EngineConfig) -> Result<Self> {
        let significance = &config.significance;
        Self::with_settings(
            significance.confidence_level,
            significance.power,
            significance.min_sample_size,
        )
    }

    /// Create a tester with explicit settings
    pub fn with_settings(confidence_level: f64, power: f64, min_sample_size: u64) -> Result<Self> {
        if confidence_level <= 0.0 || confidence_level >= 1.0 {
            return Err(DecisionError::InvalidConfig(
                "Confidence level must be between 0 and 1".to_string(),
            ));
        }

        if power <= 0.0 || power >= 1.0 {
            return Err(DecisionError::InvalidConfig(
                "Power must be between 0 and 1".to_string(),
            ));
        }

        Ok(Self {
            confidence_level,
            power,
            min_sample_size,
        })
    }

    pub fn confidence_level(&self) -> f64 {
        self.confidence_level
    }

    pub fn min_sample_size(&self) -> u64 {
        self.min_sample_size
    }

    /// Derived metrics for one variant
    pub fn variant_metrics(variant: &VariantResult) -> VariantMetrics {
        VariantMetrics {
            variant_id: variant.variant_id.clone(),
            ctr: calculate_ctr(variant.clicks, variant.impressions),
            cpc: calculate_cpc(variant.ad_spend, variant.clicks),
            cpa: calculate_cpa(variant.ad_spend, variant.conversions),
            roas: calculate_roas(variant.revenue, variant.ad_spend),
            conversion_rate: calculate_conversion_rate(variant.conversions, variant.clicks),
            sample_size: variant.sample_size(),
        }
    }

    /// Compare variants against the first one (the control)
    pub fn compare_variants(&self, variants: &[VariantResult]) -> Result<ABTestVerdict> {
        if variants.len() < 2 {
            return Err(DecisionError::InsufficientVariants(variants.len()));
        }

        let control = &variants[0];
        let metrics: Vec<VariantMetrics> = variants.iter().map(Self::variant_metrics).collect();

        // Challenger: the variant furthest from control
        let mut challenger = ZTest::new(
            control.conversions,
            control.impressions,
            variants[1].conversions,
            variants[1].impressions,
        );
        for variant in &variants[2..] {
            let candidate = ZTest::new(
                control.conversions,
                control.impressions,
                variant.conversions,
                variant.impressions,
            );
            if candidate.z_statistic().abs() > challenger.z_statistic().abs() {
                challenger = candidate;
            }
        }

        let z_score = challenger.z_statistic();
        let p_value = challenger.test()?;
        let lift_percent = challenger.lift_percent();

        let ready = variants
            .iter()
            .all(|v| v.sample_size() >= self.min_sample_size);

        if !ready {
            debug!(
                "A/B test still running: a variant has fewer than {} impressions",
                self.min_sample_size
            );
            return Ok(ABTestVerdict {
                winner: None,
                is_significant: false,
                p_value,
                z_score,
                lift_percent,
                confidence_level: self.confidence_level,
                status: TestStatus::Running,
                variants: metrics,
            });
        }

        let is_significant = z_score.abs() >= z_critical(self.confidence_level);

        let (winner, status) = if is_significant {
            let best = metrics
                .iter()
                .fold(None::<&VariantMetrics>, |best, m| match best {
                    Some(b) if b.roas >= m.roas => Some(b),
                    _ => Some(m),
                })
                .map(|m| m.variant_id.clone());
            (best, TestStatus::Complete)
        } else {
            (None, TestStatus::Inconclusive)
        };

        info!(
            "A/B verdict: status={:?}, winner={:?}, z={:.3}, p={:.4}, lift={:.2}%",
            status, winner, z_score, p_value, lift_percent
        );

        Ok(ABTestVerdict {
            winner,
            is_significant,
            p_value,
            z_score,
            lift_percent,
            confidence_level: self.confidence_level,
            status,
            variants: metrics,
        })
    }

    /// Per-variant sample size needed to detect `min_detectable_effect`
    pub fn required_sample_size(&self, baseline_rate: f64, min_detectable_effect: f64) -> Result<u64> {
        required_sample_size(
            baseline_rate,
            min_detectable_effect,
            self.confidence_level,
            self.power,
        )
    }
}

impl Default for SignificanceTester {
    fn default() -> Self {
        Self {
            confidence_level: 0.95,
            power: 0.8,
            min_sample_size: 1000,
        }
    }
}

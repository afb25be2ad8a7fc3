//! Lookalike audience sizing

use adsignal_types::LookalikeEstimate;

use crate::errors::{DecisionError, Result};

/// Estimate a lookalike audience for a country
///
/// `similarity` runs from 1 (closest 1% of the population) to 10 (broadest
/// 10%). Precision falls linearly as the audience widens.
pub fn estimate_lookalike(country_population: u64, similarity: u8) -> Result<LookalikeEstimate> {
    if !(1..=10).contains(&similarity) {
        return Err(DecisionError::InvalidRange(format!(
            "similarity must be between 1 and 10, got {}",
            similarity
        )));
    }

    let audience_size = (country_population as u128 * similarity as u128 / 100) as u64;
    let match_precision = (11 - similarity) as f64 / 10.0;

    Ok(LookalikeEstimate {
        similarity,
        audience_size,
        match_precision,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closest_lookalike() {
        let estimate = estimate_lookalike(330_000_000, 1).unwrap();

        assert_eq!(estimate.audience_size, 3_300_000);
        assert_eq!(estimate.match_precision, 1.0);
    }

    #[test]
    fn test_broadest_lookalike() {
        let estimate = estimate_lookalike(1_005, 10).unwrap();

        // Rounded down
        assert_eq!(estimate.audience_size, 100);
        assert_eq!(estimate.match_precision, 0.1);
    }

    #[test]
    fn test_similarity_out_of_range() {
        assert!(matches!(estimate_lookalike(1000, 0), Err(DecisionError::InvalidRange(_))));
        assert!(matches!(estimate_lookalike(1000, 11), Err(DecisionError::InvalidRange(_))));
    }
}

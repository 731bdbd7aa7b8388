//! Offline distance estimation from ZIP code structure.
//!
//! This module provides [`ZipPrefixEstimator`], an estimator that needs no
//! network access. Numeric ZIPs score by absolute numeric difference;
//! everything else scores by how little of a shared prefix the two codes
//! have. Scores are ordering keys only; the display strings compress them
//! onto a rough miles/minutes scale for the driver's route view.

use milkrun_core::{DistanceEstimator, EstimateError, LegEstimate};

/// Multiplier applied per unmatched character when codes are not numeric.
const MISMATCH_FACTOR: f64 = 10.0;

/// Cap on unmatched characters so prefix scores stay finite.
const MAX_UNMATCHED: usize = 9;

/// Minutes per displayed mile at delivery-van speeds.
const MINUTES_PER_MILE: f64 = 2.0;

/// Minimum displayed ETA in minutes.
const MIN_ETA_MINUTES: f64 = 1.0;

/// Offline estimator driven by ZIP code structure.
///
/// Scores are deterministic for a given pair and the
/// [`UNKNOWN_ZIP`](milkrun_core::UNKNOWN_ZIP) sentinel is accepted on either
/// side, so the estimator never fails. Use it where no estimate service is
/// reachable.
///
/// # Examples
///
/// ```rust
/// use milkrun_core::{DistanceEstimator, EstimateError};
/// use milkrun_data::ZipPrefixEstimator;
///
/// let estimator = ZipPrefixEstimator::new();
/// let near = estimator.estimate("06901", "06905")?;
/// let far = estimator.estimate("06901", "10001")?;
/// assert!(near.score < far.score);
/// # Ok::<(), EstimateError>(())
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct ZipPrefixEstimator;

impl ZipPrefixEstimator {
    /// Create a new estimator.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl DistanceEstimator for ZipPrefixEstimator {
    fn estimate(
        &self,
        origin_zip: &str,
        destination_zip: &str,
    ) -> Result<LegEstimate, EstimateError> {
        let score = match (origin_zip.parse::<u32>(), destination_zip.parse::<u32>()) {
            (Ok(origin), Ok(destination)) => f64::from(origin.abs_diff(destination)),
            _ => prefix_score(origin_zip, destination_zip),
        };
        let (display_distance, display_eta) = display_strings(score);
        Ok(LegEstimate {
            score,
            display_distance,
            display_eta,
        })
    }
}

/// Score two codes by the length of their shared prefix.
///
/// Identical codes score zero; each unmatched character multiplies the score
/// by [`MISMATCH_FACTOR`], capped at [`MAX_UNMATCHED`] characters.
fn prefix_score(origin: &str, destination: &str) -> f64 {
    if origin == destination {
        return 0.0;
    }
    let shared = origin
        .chars()
        .zip(destination.chars())
        .take_while(|(lhs, rhs)| lhs == rhs)
        .count();
    let longest = origin.chars().count().max(destination.chars().count());
    let unmatched = longest.saturating_sub(shared).min(MAX_UNMATCHED);
    MISMATCH_FACTOR.powi(unmatched as i32)
}

/// Derive display strings from a score.
///
/// The square root pulls large numeric-difference scores onto a rough miles
/// scale; the ETA follows at [`MINUTES_PER_MILE`].
fn display_strings(score: f64) -> (String, String) {
    let miles = score.sqrt();
    let minutes = (miles * MINUTES_PER_MILE).max(MIN_ETA_MINUTES);
    (format!("{miles:.1} mi"), format!("{minutes:.0} min"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    use milkrun_core::UNKNOWN_ZIP;

    #[rstest]
    fn numeric_zips_score_by_absolute_difference() {
        let estimator = ZipPrefixEstimator::new();

        let estimate = estimator.estimate("06901", "06905").expect("never fails");

        assert_eq!(estimate.score, 4.0);
    }

    #[rstest]
    fn scoring_is_symmetric_for_numeric_zips() {
        let estimator = ZipPrefixEstimator::new();

        let forward = estimator.estimate("06901", "10001").expect("never fails");
        let reverse = estimator.estimate("10001", "06901").expect("never fails");

        assert_eq!(forward.score, reverse.score);
    }

    #[rstest]
    #[case("06901", "06901")]
    #[case("SW1A 1AA", "SW1A 1AA")]
    fn identical_codes_score_zero(#[case] origin: &str, #[case] destination: &str) {
        let estimate = ZipPrefixEstimator::new()
            .estimate(origin, destination)
            .expect("never fails");

        assert_eq!(estimate.score, 0.0);
    }

    #[rstest]
    fn sentinel_origin_scores_by_destination_value() {
        let estimate = ZipPrefixEstimator::new()
            .estimate(UNKNOWN_ZIP, "06901")
            .expect("sentinel must not error");

        assert_eq!(estimate.score, 6901.0);
    }

    #[rstest]
    fn non_numeric_codes_score_by_shared_prefix() {
        let estimator = ZipPrefixEstimator::new();

        let near = estimator
            .estimate("SW1A 1AA", "SW1A 2BB")
            .expect("never fails");
        let far = estimator
            .estimate("SW1A 1AA", "EC2N 4AY")
            .expect("never fails");

        assert_eq!(near.score, 1_000.0);
        assert_eq!(far.score, 100_000_000.0);
        assert!(near.score < far.score);
    }

    #[rstest]
    fn mixed_codes_fall_back_to_prefix_scoring() {
        let estimate = ZipPrefixEstimator::new()
            .estimate("06901", "SW1A")
            .expect("never fails");

        // No shared character over five positions.
        assert_eq!(estimate.score, 100_000.0);
    }

    #[rstest]
    fn display_strings_compress_the_score() {
        let estimate = ZipPrefixEstimator::new()
            .estimate("06901", "06905")
            .expect("never fails");

        assert_eq!(estimate.display_distance, "2.0 mi");
        assert_eq!(estimate.display_eta, "4 min");
    }

    #[rstest]
    fn zero_score_keeps_a_minimum_eta() {
        let estimate = ZipPrefixEstimator::new()
            .estimate("06901", "06901")
            .expect("never fails");

        assert_eq!(estimate.display_distance, "0.0 mi");
        assert_eq!(estimate.display_eta, "1 min");
    }
}

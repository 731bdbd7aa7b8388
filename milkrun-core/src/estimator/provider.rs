//! Distance estimator trait and the estimate it yields per leg.

use super::error::EstimateError;

/// Result of estimating one leg.
///
/// `score` is an opaque ordering key: lower means nearer. The sequencer only
/// ever compares scores from the same estimator; it never does arithmetic on
/// them or ascribes units to them. The display strings pass through to the
/// driver's route view untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct LegEstimate {
    /// Comparable proximity score; lower is nearer.
    pub score: f64,
    /// Human-readable distance, e.g. `"3.2 mi"`.
    pub display_distance: String,
    /// Human-readable arrival estimate, e.g. `"12 min"`.
    pub display_eta: String,
}

/// Score the leg between two zip codes.
///
/// Implementations must be deterministic for a given pair within a process
/// run: the sequencer assumes that comparing two candidate destinations
/// against the same origin is stable while a route is being built. The
/// [`UNKNOWN_ZIP`](crate::UNKNOWN_ZIP) sentinel is a valid input on either
/// side and must yield an estimate rather than an error.
///
/// # Examples
///
/// ```rust
/// use milkrun_core::{DistanceEstimator, EstimateError, LegEstimate};
///
/// struct FlatEstimator;
///
/// impl DistanceEstimator for FlatEstimator {
///     fn estimate(
///         &self,
///         _origin_zip: &str,
///         _destination_zip: &str,
///     ) -> Result<LegEstimate, EstimateError> {
///         Ok(LegEstimate {
///             score: 1.0,
///             display_distance: "1.0 mi".into(),
///             display_eta: "5 min".into(),
///         })
///     }
/// }
///
/// let estimate = FlatEstimator.estimate("06901", "06905")?;
/// assert_eq!(estimate.display_eta, "5 min");
/// # Ok::<(), EstimateError>(())
/// ```
pub trait DistanceEstimator {
    /// Estimate the leg from `origin_zip` to `destination_zip`.
    fn estimate(
        &self,
        origin_zip: &str,
        destination_zip: &str,
    ) -> Result<LegEstimate, EstimateError>;
}

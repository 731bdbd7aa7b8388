//! Estimate legs between zip codes.
//!
//! The `DistanceEstimator` trait abstracts the scoring of an
//! (origin zip, destination zip) pair. The sequencer compares scores to pick
//! the next stop and shows the display figures to the driver.
//!
//! Implementations must be deterministic for a given pair within a process
//! run and must accept the [`UNKNOWN_ZIP`](crate::UNKNOWN_ZIP) sentinel.

mod error;
mod provider;

pub use error::EstimateError;
pub use provider::{DistanceEstimator, LegEstimate};

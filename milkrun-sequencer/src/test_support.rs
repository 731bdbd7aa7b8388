//! Test-only utilities for `milkrun-sequencer`.
//!
//! The helpers in this module are available to unit tests and behavioural
//! tests. They are gated behind the `test-support` feature (and
//! `cfg(test)`).

use milkrun_core::{FulfillmentStatus, RoutePosition, Stop, StopId};

/// Construct an active stop headed for `zip`.
///
/// # Examples
/// ```rust
/// use milkrun_sequencer::test_support::stop;
///
/// let stop = stop(1, "06901");
/// assert!(!stop.is_completed());
/// assert!(stop.route_position.is_none());
/// ```
#[must_use]
pub fn stop(id: u64, zip: &str) -> Stop {
    Stop::new(StopId(id), Some(zip.to_owned())).with_status(FulfillmentStatus::DriverAssigned)
}

/// Construct an active stop with a saved route position.
#[must_use]
pub fn positioned(id: u64, zip: &str, position: u32) -> Stop {
    stop(id, zip).with_position(route_position(position))
}

/// Construct a dispatcher-pinned stop with a saved route position.
#[must_use]
pub fn pinned(id: u64, zip: &str, position: u32) -> Stop {
    positioned(id, zip, position).with_override()
}

/// Construct a delivered stop with a saved route position.
#[must_use]
pub fn delivered(id: u64, zip: &str, position: u32) -> Stop {
    positioned(id, zip, position).with_status(FulfillmentStatus::Delivered)
}

/// Convert a raw position, clamping zero to one.
#[must_use]
pub fn route_position(position: u32) -> RoutePosition {
    RoutePosition::new(position).unwrap_or(RoutePosition::MIN)
}

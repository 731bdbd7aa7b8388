//! Route sequencing engine for Milkrun drivers.
//!
//! [`RouteSequencer`] turns a driver's outstanding delivery stops into a
//! stable, positioned route. Completed stops keep their saved positions and
//! lead the route; dispatcher-pinned stops follow in their saved order; the
//! remainder is ordered by a greedy nearest-neighbour pass over a
//! [`DistanceEstimator`](milkrun_core::DistanceEstimator). Newly assigned
//! positions are written back through the
//! [`OrderStore`](milkrun_core::OrderStore), so a route that has already
//! been sequenced is reused verbatim on the next request instead of being
//! reshuffled under the driver.
//!
//! [`RouteService`] is the query surface: it authorises the caller, applies
//! date and status filters, and renders the sequenced route as a
//! [`RouteView`]. Concurrent requests for one driver are serialised by a
//! per-driver lease ([`DriverLocks`]); requests for distinct drivers run in
//! parallel.

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod locks;
mod sequencer;
mod service;
mod view;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use locks::DriverLocks;
pub use sequencer::{RouteSequencer, SequenceError};
pub use service::{Caller, RouteQuery, RouteQueryError, RouteService};
pub use view::{DeliveryView, RouteView, StatusFilter};

//! Core domain types for the Milkrun engine.
//!
//! This crate defines the vocabulary shared by every other Milkrun crate:
//! delivery [`Stop`]s and their fulfillment lifecycle, sequenced
//! [`DriverRoute`]s with per-leg annotations, and the two port traits the
//! engine is generic over: [`OrderStore`] for persistence and
//! [`DistanceEstimator`] for proximity scoring.
//!
//! The ports keep the sequencing logic honest: it can only list stops,
//! compare leg scores, and write back route positions. Concrete adapters
//! (SQLite persistence here behind the `store-sqlite` feature, HTTP and
//! offline estimators in `milkrun-data`) plug in at the edges.

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod estimator;
mod route;
mod stop;
mod store;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use estimator::{DistanceEstimator, EstimateError, LegEstimate};
pub use route::{DriverRoute, LegInfo, RouteMetadata, RoutedStop};
pub use stop::{DriverId, FulfillmentStatus, RoutePosition, Stop, StopId, UNKNOWN_ZIP};
pub use store::{OrderStore, OrderStoreError, StopFilter};

#[cfg(feature = "store-sqlite")]
pub use store::{SqliteOrderStore, SqliteOrderStoreError};

//! Facade crate for the Milkrun route sequencing engine.
//!
//! This crate re-exports the core domain types and exposes the sequencer,
//! the SQLite order store, and distance estimator adapters behind feature
//! flags.

#![forbid(unsafe_code)]

pub use milkrun_core::{
    DistanceEstimator, DriverId, DriverRoute, EstimateError, FulfillmentStatus, LegEstimate,
    LegInfo, OrderStore, OrderStoreError, RouteMetadata, RoutePosition, RoutedStop, Stop,
    StopFilter, StopId, UNKNOWN_ZIP,
};

#[cfg(feature = "store-sqlite")]
pub use milkrun_core::{SqliteOrderStore, SqliteOrderStoreError};

#[cfg(feature = "sequencer")]
pub use milkrun_sequencer::{
    Caller, DeliveryView, DriverLocks, RouteQuery, RouteQueryError, RouteSequencer, RouteService,
    RouteView, SequenceError, StatusFilter,
};

#[cfg(feature = "estimators")]
pub use milkrun_data::{
    EstimatorBuildError, HttpDistanceEstimator, HttpDistanceEstimatorConfig, ZipPrefixEstimator,
};

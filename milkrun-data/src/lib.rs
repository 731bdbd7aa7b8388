//! External adapters for the Milkrun delivery engine.
//!
//! Responsibilities:
//! - Implement the [`DistanceEstimator`](milkrun_core::DistanceEstimator)
//!   capability against external services and offline fallbacks.
//! - Keep blocking I/O off async executors; bridge async clients behind the
//!   synchronous core traits.
//!
//! Boundaries:
//! - Do not encode sequencing rules (they live in `milkrun-core` and
//!   `milkrun-sequencer`).
//! - No global mutable state; every adapter owns its resources.

#![forbid(unsafe_code)]

pub mod estimator;

pub use estimator::{
    EstimatorBuildError, HttpDistanceEstimator, HttpDistanceEstimatorConfig, ZipPrefixEstimator,
};

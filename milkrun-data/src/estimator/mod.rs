//! Distance estimators for route sequencing.
//!
//! This module provides [`HttpDistanceEstimator`], an implementation of
//! [`milkrun_core::DistanceEstimator`] that fetches leg estimates from an
//! external estimate service, and [`ZipPrefixEstimator`], an offline fallback
//! that scores legs from ZIP code structure alone.
//!
//! # Architecture
//!
//! The HTTP estimator issues one GET request per leg. The synchronous
//! [`DistanceEstimator`](milkrun_core::DistanceEstimator) trait is
//! implemented by blocking on async HTTP calls internally, keeping the core
//! library embeddable in synchronous contexts.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use milkrun_core::DistanceEstimator;
//! use milkrun_data::estimator::{HttpDistanceEstimator, HttpDistanceEstimatorConfig};
//!
//! // Create an estimator with custom configuration
//! let config = HttpDistanceEstimatorConfig::new("http://localhost:8080")
//!     .with_timeout(Duration::from_secs(60))
//!     .with_user_agent("my-app/1.0");
//! let estimator = HttpDistanceEstimator::with_config(config)?;
//!
//! let estimate = estimator.estimate("06901", "06905")?;
//! println!("Leg: {} ({})", estimate.display_distance, estimate.display_eta);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod http;
mod prefix;
mod wire;

pub use http::{
    DEFAULT_USER_AGENT, EstimatorBuildError, HttpDistanceEstimator, HttpDistanceEstimatorConfig,
};
pub use prefix::ZipPrefixEstimator;

//! HTTP-based `DistanceEstimator` backed by an external estimate service.
//!
//! This module provides [`HttpDistanceEstimator`], an implementation of the
//! [`DistanceEstimator`] trait that fetches leg estimates from an estimate
//! service via HTTP.
//!
//! # Architecture
//!
//! The [`DistanceEstimator`] trait is synchronous to keep the core library
//! embeddable in synchronous contexts. This estimator bridges the async HTTP
//! calls to the sync interface by blocking on a Tokio runtime internally.
//!
//! # Example
//!
//! ```no_run
//! use milkrun_core::DistanceEstimator;
//! use milkrun_data::HttpDistanceEstimator;
//!
//! let estimator = HttpDistanceEstimator::new("http://localhost:8080")?;
//! let estimate = estimator.estimate("06901", "06905")?;
//! println!("score: {}", estimate.score);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::time::Duration;

use milkrun_core::{DistanceEstimator, EstimateError, LegEstimate};
use reqwest::Client;
use tokio::runtime::{Handle, Runtime, RuntimeFlavor};

use super::wire::EstimateResponse;

/// Error type for [`HttpDistanceEstimator`] construction failures.
#[derive(Debug)]
pub enum EstimatorBuildError {
    /// Failed to build the HTTP client.
    HttpClient(reqwest::Error),
    /// Failed to build the Tokio runtime.
    Runtime(std::io::Error),
}

impl std::fmt::Display for EstimatorBuildError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::HttpClient(err) => write!(f, "failed to build HTTP client: {err}"),
            Self::Runtime(err) => write!(f, "failed to build Tokio runtime: {err}"),
        }
    }
}

impl std::error::Error for EstimatorBuildError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::HttpClient(err) => Some(err),
            Self::Runtime(err) => Some(err),
        }
    }
}

/// Default user agent for estimate requests.
pub const DEFAULT_USER_AGENT: &str = "milkrun-estimator/0.1";

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for [`HttpDistanceEstimator`].
#[derive(Debug, Clone)]
pub struct HttpDistanceEstimatorConfig {
    /// Base URL for the estimate service (e.g., `"http://localhost:8080"`).
    pub base_url: String,
    /// Request timeout duration.
    pub timeout: Duration,
    /// User agent string for requests.
    pub user_agent: String,
}

impl Default for HttpDistanceEstimatorConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl HttpDistanceEstimatorConfig {
    /// Create a new configuration with the given base URL.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Set the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent string.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// HTTP-based distance estimator.
///
/// This estimator implements the synchronous [`DistanceEstimator`] trait by
/// internally blocking on asynchronous HTTP requests. It owns a Tokio runtime
/// that is reused across calls, avoiding the overhead of creating a new
/// runtime per leg.
///
/// # Runtime behaviour
///
/// When called from outside any Tokio runtime, the estimator uses its own
/// stored runtime. When called from within an existing multi-threaded Tokio
/// runtime (detected via [`Handle::try_current()`] and
/// [`RuntimeFlavor::MultiThread`]), it uses that runtime's handle with
/// [`tokio::task::block_in_place`] to avoid nested runtime panics.
///
/// When called from within a `current_thread` Tokio runtime, the estimator
/// falls back to using its own internal runtime. This avoids the panic that
/// `block_in_place` would cause, but may lead to deadlocks if the caller's
/// runtime is driving IO or timers that this request depends on.
pub struct HttpDistanceEstimator {
    client: Client,
    config: HttpDistanceEstimatorConfig,
    runtime: Runtime,
}

impl std::fmt::Debug for HttpDistanceEstimator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpDistanceEstimator")
            .field("client", &self.client)
            .field("config", &self.config)
            .field("runtime", &"<tokio::runtime::Runtime>")
            .finish()
    }
}

impl HttpDistanceEstimator {
    /// Create a new estimator with default configuration.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Base URL for the estimate service (e.g.,
    ///   `"http://localhost:8080"`)
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client or Tokio runtime fails to build.
    pub fn new(base_url: impl Into<String>) -> Result<Self, EstimatorBuildError> {
        Self::with_config(HttpDistanceEstimatorConfig::new(base_url))
    }

    /// Create a new estimator with explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client or Tokio runtime fails to build.
    pub fn with_config(config: HttpDistanceEstimatorConfig) -> Result<Self, EstimatorBuildError> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .connect_timeout(config.timeout)
            .timeout(config.timeout)
            .build()
            .map_err(EstimatorBuildError::HttpClient)?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(EstimatorBuildError::Runtime)?;
        Ok(Self {
            client,
            config,
            runtime,
        })
    }

    /// Build the estimate URL for the given ZIP pair.
    ///
    /// The URL format is: `{base_url}/v1/estimate?from={origin}&to={destination}`.
    fn build_estimate_url(&self, origin_zip: &str, destination_zip: &str) -> String {
        format!(
            "{}/v1/estimate?from={origin_zip}&to={destination_zip}",
            self.config.base_url.trim_end_matches('/'),
        )
    }

    /// Fetch the leg estimate asynchronously.
    async fn fetch_estimate_async(
        &self,
        origin_zip: &str,
        destination_zip: &str,
    ) -> Result<LegEstimate, EstimateError> {
        let url = self.build_estimate_url(origin_zip, destination_zip);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|err| self.convert_reqwest_error(&err, &url))?
            .error_for_status()
            .map_err(|err| self.convert_reqwest_error(&err, &url))?;

        let estimate_response: EstimateResponse =
            response
                .json()
                .await
                .map_err(|err| EstimateError::ParseError {
                    message: err.to_string(),
                })?;

        self.convert_response(estimate_response)
    }

    /// Convert a reqwest error to an `EstimateError`.
    fn convert_reqwest_error(&self, error: &reqwest::Error, url: &str) -> EstimateError {
        if error.is_timeout() {
            return EstimateError::Timeout {
                url: url.to_owned(),
                timeout_secs: self.config.timeout.as_secs(),
            };
        }

        if let Some(status) = error.status() {
            return EstimateError::HttpError {
                url: url.to_owned(),
                status: status.as_u16(),
                message: error.to_string(),
            };
        }

        EstimateError::NetworkError {
            url: url.to_owned(),
            message: error.to_string(),
        }
    }

    /// Convert a service response to a `LegEstimate`.
    fn convert_response(&self, response: EstimateResponse) -> Result<LegEstimate, EstimateError> {
        if !response.is_ok() {
            return Err(EstimateError::ServiceError {
                code: response.code,
                message: response.message.unwrap_or_default(),
            });
        }

        let score = response.score.ok_or_else(|| EstimateError::ParseError {
            message: "estimate response missing score".to_string(),
        })?;

        // NaN and infinite scores would poison nearest-stop comparisons.
        if !score.is_finite() {
            return Err(EstimateError::ParseError {
                message: format!("estimate score is not finite: {score}"),
            });
        }

        Ok(LegEstimate {
            score,
            display_distance: response.distance.unwrap_or_default(),
            display_eta: response.eta.unwrap_or_default(),
        })
    }
}

impl DistanceEstimator for HttpDistanceEstimator {
    /// Fetch the estimate for one leg.
    ///
    /// # Runtime requirements
    ///
    /// When called from within an existing Tokio runtime, the runtime must be
    /// multi-threaded (`flavor = "multi_thread"`). If called from within a
    /// `current_thread` runtime, the method falls back to using its own
    /// internal runtime, which may block the caller's runtime and cause
    /// deadlocks if the caller's runtime is driving IO or timers needed by
    /// this request.
    fn estimate(
        &self,
        origin_zip: &str,
        destination_zip: &str,
    ) -> Result<LegEstimate, EstimateError> {
        // If we're already inside a Tokio runtime, check the runtime flavour.
        // block_in_place requires a multi-threaded runtime; for current_thread
        // runtimes we fall back to our own stored runtime.
        let future = self.fetch_estimate_async(origin_zip, destination_zip);
        match Handle::try_current() {
            Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
                tokio::task::block_in_place(|| handle.block_on(future))
            }
            // No runtime detected, or current_thread runtime: use our own runtime.
            _ => self.runtime.block_on(future),
        }
    }
}

use thiserror::Error;

/// Errors from [`DistanceEstimator::estimate`](super::DistanceEstimator::estimate).
///
/// The variants mirror the ways a remote estimate service can fail; offline
/// estimators typically return none of them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EstimateError {
    /// The request exceeded the configured timeout.
    #[error("estimate request to {url} timed out after {timeout_secs}s")]
    Timeout {
        /// Request URL.
        url: String,
        /// Configured timeout in seconds.
        timeout_secs: u64,
    },
    /// The service answered with a non-success HTTP status.
    #[error("estimate request to {url} failed with status {status}: {message}")]
    HttpError {
        /// Request URL.
        url: String,
        /// HTTP status code.
        status: u16,
        /// Error detail from the client.
        message: String,
    },
    /// The request never reached the service.
    #[error("estimate request to {url} failed: {message}")]
    NetworkError {
        /// Request URL.
        url: String,
        /// Error detail from the client.
        message: String,
    },
    /// The response payload could not be interpreted.
    #[error("could not parse estimate response: {message}")]
    ParseError {
        /// Parse failure detail.
        message: String,
    },
    /// The service understood the request and rejected it.
    #[error("estimate service returned {code}: {message}")]
    ServiceError {
        /// Service-defined failure code.
        code: String,
        /// Service-provided message, empty when absent.
        message: String,
    },
}

//! Estimate service response types.
//!
//! This module provides deserialisation types for the leg estimate endpoint.
//! The endpoint scores a single origin/destination ZIP pair and returns
//! display strings for the driver's route view alongside the score.

use serde::Deserialize;

/// Leg estimate service response.
///
/// The response contains a score and display strings on success or an error
/// message on failure. The `code` field indicates the response status.
#[derive(Debug, Deserialize)]
pub struct EstimateResponse {
    /// Status code from the estimate service.
    ///
    /// Common values:
    /// - `"Ok"` - Request was successful
    /// - `"InvalidZip"` - A ZIP code could not be interpreted
    /// - `"NoRoute"` - The service has no estimate for the pair
    pub code: String,

    /// Optional error message when `code` is not `"Ok"`.
    pub message: Option<String>,

    /// Ordering score for the leg. Lower means nearer.
    pub score: Option<f64>,

    /// Display distance for the driver UI (e.g. `"4.2 mi"`).
    pub distance: Option<String>,

    /// Display ETA for the driver UI (e.g. `"12 min"`).
    pub eta: Option<String>,
}

impl EstimateResponse {
    /// Check if the response indicates success.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.code == "Ok"
    }
}

//! Data access traits for delivery stops.
//!
//! The `OrderStore` trait defines the engine's view of order persistence:
//! list the stops a driver may be sent to and save assigned route positions.
//! Reads are filtered; writes touch exactly one field of one stop.

use chrono::NaiveDate;
use thiserror::Error;

use crate::{DriverId, FulfillmentStatus, RoutePosition, Stop, StopId};

#[cfg(feature = "store-sqlite")]
mod sqlite;

#[cfg(feature = "store-sqlite")]
pub use sqlite::{SqliteOrderStore, SqliteOrderStoreError};

/// Row-level filter for [`OrderStore::list_stops`].
///
/// Both fields are conjunctive: a stop must match every filter that is set.
///
/// # Examples
/// ```
/// use chrono::NaiveDate;
/// use milkrun_core::{Stop, StopFilter, StopId};
///
/// let date = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();
/// let filter = StopFilter::new().with_date(date);
///
/// let due = Stop::new(StopId(1), None).with_delivery_date(date);
/// let undated = Stop::new(StopId(2), None);
/// assert!(filter.matches(&due));
/// assert!(!filter.matches(&undated));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StopFilter {
    /// Keep only stops due on this exact calendar date.
    pub date: Option<NaiveDate>,
    /// Keep only stops whose status matches exactly.
    pub status: Option<FulfillmentStatus>,
}

impl StopFilter {
    /// Construct an empty filter that matches every stop.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict to a delivery date while returning `self` for chaining.
    #[must_use]
    pub const fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    /// Restrict to a fulfillment status while returning `self` for chaining.
    #[must_use]
    pub const fn with_status(mut self, status: FulfillmentStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Whether a stop passes every set filter.
    ///
    /// A date filter excludes undated stops; a status filter matches the
    /// status exactly.
    pub fn matches(&self, stop: &Stop) -> bool {
        let date_ok = self.date.is_none_or(|date| stop.delivery_date == Some(date));
        let status_ok = self
            .status
            .is_none_or(|status| stop.fulfillment_status == status);
        date_ok && status_ok
    }
}

/// Errors from [`OrderStore`] operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderStoreError {
    /// Listing the driver's stops failed.
    #[error("failed to list stops for driver {driver}: {message}")]
    ListFailed {
        /// Driver whose listing was requested.
        driver: DriverId,
        /// Backend failure detail.
        message: String,
    },
    /// Persisting a stop's route position failed.
    #[error("failed to update route position for stop {stop}: {message}")]
    UpdateFailed {
        /// Stop whose position was being written.
        stop: StopId,
        /// Backend failure detail.
        message: String,
    },
    /// The stop to update does not exist.
    #[error("stop {stop} not found")]
    StopNotFound {
        /// Identifier that matched no stop.
        stop: StopId,
    },
}

/// Access to persisted delivery stops.
///
/// `list_stops` returns the stops a driver may be routed to: stops assigned
/// to that driver plus unassigned stops. The returned order must be stable
/// and deterministic for a given store state; the sequencer uses it as the
/// tie-break order when proximity scores are equal.
///
/// # Examples
///
/// ```rust
/// use std::sync::Mutex;
/// use milkrun_core::{
///     DriverId, OrderStore, OrderStoreError, RoutePosition, Stop, StopFilter, StopId,
/// };
///
/// struct MemoryStore {
///     stops: Mutex<Vec<Stop>>,
/// }
///
/// impl OrderStore for MemoryStore {
///     fn list_stops(
///         &self,
///         driver: DriverId,
///         filter: &StopFilter,
///     ) -> Result<Vec<Stop>, OrderStoreError> {
///         let stops = self.stops.lock().expect("store lock");
///         Ok(stops
///             .iter()
///             // Unassigned stops appear in every driver's listing.
///             .filter(|stop| stop.driver.is_none_or(|d| d == driver))
///             .filter(|stop| filter.matches(stop))
///             .cloned()
///             .collect())
///     }
///
///     fn update_route_position(
///         &self,
///         stop: StopId,
///         position: RoutePosition,
///     ) -> Result<(), OrderStoreError> {
///         let mut stops = self.stops.lock().expect("store lock");
///         let target = stops
///             .iter_mut()
///             .find(|s| s.id == stop)
///             .ok_or(OrderStoreError::StopNotFound { stop })?;
///         target.route_position = Some(position);
///         Ok(())
///     }
/// }
///
/// let store = MemoryStore {
///     stops: Mutex::new(vec![Stop::new(StopId(1), Some("06901".into()))]),
/// };
/// let listed = store.list_stops(DriverId(1), &StopFilter::new())?;
/// assert_eq!(listed.len(), 1);
/// # Ok::<(), OrderStoreError>(())
/// ```
pub trait OrderStore {
    /// Return the stops visible to `driver`, in a stable order.
    ///
    /// The listing includes stops assigned to the driver and stops assigned
    /// to nobody. Filters narrow the result; they never widen it.
    fn list_stops(
        &self,
        driver: DriverId,
        filter: &StopFilter,
    ) -> Result<Vec<Stop>, OrderStoreError>;

    /// Persist a stop's route position.
    ///
    /// Writes exactly one field of one stop and is idempotent: repeating a
    /// write with the same position is a no-op.
    fn update_route_position(
        &self,
        stop: StopId,
        position: RoutePosition,
    ) -> Result<(), OrderStoreError>;
}

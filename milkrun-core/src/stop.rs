//! Stops and their fulfillment lifecycle.
//!
//! A stop is one delivery order on a driver's day: where it goes, how far
//! along fulfillment it is, and where it sits in the driver's route.

use std::num::NonZeroU32;

use chrono::NaiveDate;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Sentinel routing zip used when a stop has no usable destination zip.
///
/// Estimators must accept it like any other zip; it never causes an error by
/// itself.
pub const UNKNOWN_ZIP: &str = "00000";

/// One-based position of a stop within a driver's route.
///
/// `Option<RoutePosition>` models the "unassigned" state; the non-zero type
/// rules out a zero position at compile time.
pub type RoutePosition = NonZeroU32;

/// Unique identifier of a stop.
///
/// # Examples
/// ```
/// use milkrun_core::StopId;
///
/// let id = StopId(7);
/// assert_eq!(id.to_string(), "7");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct StopId(pub u64);

impl std::fmt::Display for StopId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier of a driver.
///
/// # Examples
/// ```
/// use milkrun_core::DriverId;
///
/// let id = DriverId(3);
/// assert_eq!(id.to_string(), "3");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct DriverId(pub u64);

impl std::fmt::Display for DriverId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Fulfillment lifecycle of a stop.
///
/// The three terminal states (`Delivered`, `Cancelled`, `Failed`) mark a stop
/// as completed; everything else is active and eligible for sequencing.
///
/// # Examples
/// ```
/// use milkrun_core::FulfillmentStatus;
///
/// assert_eq!(FulfillmentStatus::OutForDelivery.as_str(), "out_for_delivery");
/// assert!(FulfillmentStatus::Cancelled.is_completed());
/// assert!(!FulfillmentStatus::Preparing.is_completed());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum FulfillmentStatus {
    /// Order placed; no driver has picked it up yet.
    LookingForDriver,
    /// Kitchen is preparing the order.
    Preparing,
    /// A driver has accepted the stop.
    DriverAssigned,
    /// The driver is en route.
    OutForDelivery,
    /// Hand-off confirmed.
    Delivered,
    /// Order cancelled before delivery.
    Cancelled,
    /// Delivery attempted and abandoned.
    Failed,
}

impl FulfillmentStatus {
    /// Return the status as its snake_case wire name.
    ///
    /// # Examples
    /// ```
    /// use milkrun_core::FulfillmentStatus;
    ///
    /// assert_eq!(FulfillmentStatus::LookingForDriver.as_str(), "looking_for_driver");
    /// ```
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::LookingForDriver => "looking_for_driver",
            Self::Preparing => "preparing",
            Self::DriverAssigned => "driver_assigned",
            Self::OutForDelivery => "out_for_delivery",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
            Self::Failed => "failed",
        }
    }

    /// Whether this status ends a stop's life on the route.
    ///
    /// Completed stops keep their saved positions and are never re-sequenced.
    pub const fn is_completed(&self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled | Self::Failed)
    }
}

impl std::fmt::Display for FulfillmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for FulfillmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "looking_for_driver" => Ok(Self::LookingForDriver),
            "preparing" => Ok(Self::Preparing),
            "driver_assigned" => Ok(Self::DriverAssigned),
            "out_for_delivery" => Ok(Self::OutForDelivery),
            "delivered" => Ok(Self::Delivered),
            "cancelled" => Ok(Self::Cancelled),
            "failed" => Ok(Self::Failed),
            _ => Err(format!("unknown fulfillment status '{s}'")),
        }
    }
}

/// A delivery stop on a driver's route.
///
/// Construction starts from the identifier and destination zip; the
/// remaining fields default to an unassigned, undated, just-created stop and
/// are set with the `with_*` chainers.
///
/// # Examples
/// ```
/// use milkrun_core::{DriverId, FulfillmentStatus, Stop, StopId};
///
/// let stop = Stop::new(StopId(1), Some("06901".into()))
///     .with_driver(DriverId(9))
///     .with_status(FulfillmentStatus::DriverAssigned);
/// assert_eq!(stop.routing_zip(), "06901");
/// assert!(!stop.is_completed());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Stop {
    /// Unique identifier.
    pub id: StopId,
    /// Assigned driver; `None` means any driver's listing may include it.
    pub driver: Option<DriverId>,
    /// Calendar date the stop is due.
    pub delivery_date: Option<NaiveDate>,
    /// Destination zip code; `None` routes via [`UNKNOWN_ZIP`].
    pub destination_zip: Option<String>,
    /// Lifecycle state.
    pub fulfillment_status: FulfillmentStatus,
    /// Saved position within the route, if one has been assigned.
    pub route_position: Option<RoutePosition>,
    /// Dispatcher pin: sequence this stop ahead of the automatic remainder.
    pub route_override: bool,
}

impl Stop {
    /// Construct a stop with the given identifier and destination zip.
    ///
    /// The stop starts unassigned, undated, in
    /// [`FulfillmentStatus::LookingForDriver`], with no saved position and no
    /// override.
    ///
    /// # Examples
    /// ```
    /// use milkrun_core::{FulfillmentStatus, Stop, StopId};
    ///
    /// let stop = Stop::new(StopId(4), None);
    /// assert_eq!(stop.fulfillment_status, FulfillmentStatus::LookingForDriver);
    /// assert!(stop.route_position.is_none());
    /// ```
    pub const fn new(id: StopId, destination_zip: Option<String>) -> Self {
        Self {
            id,
            driver: None,
            delivery_date: None,
            destination_zip,
            fulfillment_status: FulfillmentStatus::LookingForDriver,
            route_position: None,
            route_override: false,
        }
    }

    /// Set the fulfillment status while returning `self` for chaining.
    #[must_use]
    pub const fn with_status(mut self, status: FulfillmentStatus) -> Self {
        self.fulfillment_status = status;
        self
    }

    /// Assign the stop to a driver while returning `self` for chaining.
    #[must_use]
    pub const fn with_driver(mut self, driver: DriverId) -> Self {
        self.driver = Some(driver);
        self
    }

    /// Set the delivery date while returning `self` for chaining.
    #[must_use]
    pub const fn with_delivery_date(mut self, date: NaiveDate) -> Self {
        self.delivery_date = Some(date);
        self
    }

    /// Set the saved route position while returning `self` for chaining.
    #[must_use]
    pub const fn with_position(mut self, position: RoutePosition) -> Self {
        self.route_position = Some(position);
        self
    }

    /// Mark the stop as dispatcher-pinned while returning `self` for chaining.
    #[must_use]
    pub const fn with_override(mut self) -> Self {
        self.route_override = true;
        self
    }

    /// The zip this stop routes through.
    ///
    /// Falls back to [`UNKNOWN_ZIP`] when no destination zip is recorded, so
    /// estimators always receive a concrete pair.
    ///
    /// # Examples
    /// ```
    /// use milkrun_core::{Stop, StopId, UNKNOWN_ZIP};
    ///
    /// assert_eq!(Stop::new(StopId(1), None).routing_zip(), UNKNOWN_ZIP);
    /// ```
    pub fn routing_zip(&self) -> &str {
        self.destination_zip.as_deref().unwrap_or(UNKNOWN_ZIP)
    }

    /// Whether the stop's status is terminal.
    pub const fn is_completed(&self) -> bool {
        self.fulfillment_status.is_completed()
    }

    /// Whether a dispatcher pin should take effect during a recompute.
    ///
    /// A pin only holds when a position was saved alongside it; an override
    /// flag without a position joins the automatically sequenced remainder.
    pub const fn is_pinned(&self) -> bool {
        self.route_override && self.route_position.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::str::FromStr;

    #[test]
    fn display_matches_as_str() {
        assert_eq!(
            FulfillmentStatus::Delivered.to_string(),
            FulfillmentStatus::Delivered.as_str()
        );
    }

    #[test]
    fn parsing_rejects_unknown() {
        let err = FulfillmentStatus::from_str("unknown").unwrap_err();
        assert!(err.contains("unknown fulfillment status"));
    }

    #[rstest]
    #[case(FulfillmentStatus::LookingForDriver)]
    #[case(FulfillmentStatus::Preparing)]
    #[case(FulfillmentStatus::DriverAssigned)]
    #[case(FulfillmentStatus::OutForDelivery)]
    #[case(FulfillmentStatus::Delivered)]
    #[case(FulfillmentStatus::Cancelled)]
    #[case(FulfillmentStatus::Failed)]
    fn wire_names_round_trip(#[case] status: FulfillmentStatus) {
        assert_eq!(FulfillmentStatus::from_str(status.as_str()), Ok(status));
    }

    #[rstest]
    #[case(FulfillmentStatus::Delivered, true)]
    #[case(FulfillmentStatus::Cancelled, true)]
    #[case(FulfillmentStatus::Failed, true)]
    #[case(FulfillmentStatus::LookingForDriver, false)]
    #[case(FulfillmentStatus::Preparing, false)]
    #[case(FulfillmentStatus::DriverAssigned, false)]
    #[case(FulfillmentStatus::OutForDelivery, false)]
    fn completion_follows_terminal_statuses(
        #[case] status: FulfillmentStatus,
        #[case] completed: bool,
    ) {
        assert_eq!(status.is_completed(), completed);
    }

    #[test]
    fn missing_zip_routes_via_sentinel() {
        let stop = Stop::new(StopId(1), None);
        assert_eq!(stop.routing_zip(), UNKNOWN_ZIP);
    }

    #[test]
    fn override_without_position_is_not_pinned() {
        let stop = Stop::new(StopId(1), Some("06901".into())).with_override();
        assert!(!stop.is_pinned());

        let pinned = stop.with_position(RoutePosition::new(2).unwrap());
        assert!(pinned.is_pinned());
    }
}

//! Sequenced driver routes.
//!
//! Aggregates ordered stops with their leg annotations and the derived
//! route metadata.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{Stop, UNKNOWN_ZIP};

/// Annotation for the leg arriving at a stop.
///
/// Completed stops carry the [`LegInfo::Completed`] marker; active stops
/// carry display figures estimated from the previous stop in the route.
///
/// # Examples
/// ```
/// use milkrun_core::LegInfo;
///
/// let leg = LegInfo::estimated("3.2 mi", "12 min");
/// assert!(matches!(leg, LegInfo::Estimated { .. }));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
pub enum LegInfo {
    /// The stop is already completed; no estimate applies.
    Completed,
    /// Estimated leg from the previous stop.
    Estimated {
        /// Human-readable distance, e.g. `"3.2 mi"`.
        distance: String,
        /// Human-readable arrival estimate, e.g. `"12 min"`.
        eta: String,
    },
}

impl LegInfo {
    /// Construct an estimated leg from display strings.
    pub fn estimated(distance: impl Into<String>, eta: impl Into<String>) -> Self {
        Self::Estimated {
            distance: distance.into(),
            eta: eta.into(),
        }
    }
}

/// A stop paired with the annotation for the leg that reaches it.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RoutedStop {
    /// The underlying stop.
    pub stop: Stop,
    /// Leg annotation for display.
    pub leg: LegInfo,
}

/// Derived facts about a sequenced route.
///
/// `current_stop_index` is always `0`: completed stops are listed first, so
/// the first active stop is the one the driver is heading to, and clients
/// index into the active portion.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RouteMetadata {
    /// Total number of stops in the route, completed included.
    pub total_stops: u32,
    /// Number of completed stops.
    pub completed_stops: u32,
    /// Index of the driver's current stop within the active portion.
    pub current_stop_index: u32,
    /// Zip the route starts from.
    pub driver_zip: String,
}

impl RouteMetadata {
    /// Metadata for a route with no stops.
    ///
    /// # Examples
    /// ```
    /// use milkrun_core::{RouteMetadata, UNKNOWN_ZIP};
    ///
    /// let meta = RouteMetadata::empty();
    /// assert_eq!(meta.total_stops, 0);
    /// assert_eq!(meta.driver_zip, UNKNOWN_ZIP);
    /// ```
    pub fn empty() -> Self {
        Self {
            total_stops: 0,
            completed_stops: 0,
            current_stop_index: 0,
            driver_zip: UNKNOWN_ZIP.to_owned(),
        }
    }
}

/// An ordered, annotated route for one driver.
///
/// Completed stops come first in saved-position order, followed by active
/// stops in sequenced order.
///
/// # Examples
/// ```
/// use milkrun_core::{DriverRoute, LegInfo, RouteMetadata, RoutedStop, Stop, StopId};
///
/// let stop = RoutedStop {
///     stop: Stop::new(StopId(1), Some("06901".into())),
///     leg: LegInfo::estimated("1.0 mi", "5 min"),
/// };
/// let mut meta = RouteMetadata::empty();
/// meta.total_stops = 1;
/// meta.driver_zip = "06901".into();
///
/// let route = DriverRoute::new(vec![stop], meta);
/// assert_eq!(route.stops.len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DriverRoute {
    /// Stops in display order.
    pub stops: Vec<RoutedStop>,
    /// Derived route facts.
    pub metadata: RouteMetadata,
}

impl DriverRoute {
    /// Construct a route from annotated stops and metadata.
    pub const fn new(stops: Vec<RoutedStop>, metadata: RouteMetadata) -> Self {
        Self { stops, metadata }
    }

    /// Construct an empty route with zeroed metadata.
    ///
    /// # Examples
    /// ```
    /// use milkrun_core::DriverRoute;
    ///
    /// let route = DriverRoute::empty();
    /// assert!(route.stops.is_empty());
    /// assert_eq!(route.metadata.completed_stops, 0);
    /// ```
    pub fn empty() -> Self {
        Self::new(Vec::new(), RouteMetadata::empty())
    }
}

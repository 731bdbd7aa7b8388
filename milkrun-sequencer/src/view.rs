//! Display-ready route views.
//!
//! [`RouteView::build`] turns a sequenced [`DriverRoute`] into the shape the
//! query surface returns: numbered deliveries with their leg annotations
//! plus the route metadata. Stop numbers are computed on the full ordered
//! route before any filtering, so a filtered view shows the same numbers a
//! driver sees on the unfiltered route.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use milkrun_core::{DriverRoute, LegInfo, RouteMetadata, RoutePosition, RoutedStop, Stop};

/// Status filter for a route view.
///
/// Parsing is infallible: the two well-known literals select whole
/// partitions, and anything else matches the status wire name exactly. An
/// unknown literal therefore selects nothing rather than erroring.
///
/// # Examples
/// ```
/// use milkrun_sequencer::StatusFilter;
///
/// assert_eq!(StatusFilter::parse("pending"), StatusFilter::Pending);
/// assert_eq!(
///     StatusFilter::parse("preparing"),
///     StatusFilter::Literal("preparing".into()),
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusFilter {
    /// All active stops.
    Pending,
    /// All completed stops.
    Delivered,
    /// Stops whose status wire name equals the literal exactly.
    Literal(String),
}

impl StatusFilter {
    /// Parse a filter from its query literal.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value {
            "pending" => Self::Pending,
            "delivered" => Self::Delivered,
            other => Self::Literal(other.to_owned()),
        }
    }

    /// Whether a stop passes this filter.
    #[must_use]
    pub fn matches(&self, stop: &Stop) -> bool {
        match self {
            Self::Pending => !stop.is_completed(),
            Self::Delivered => stop.is_completed(),
            Self::Literal(status) => stop.fulfillment_status.as_str() == status,
        }
    }
}

impl std::str::FromStr for StatusFilter {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl std::fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => f.write_str("pending"),
            Self::Delivered => f.write_str("delivered"),
            Self::Literal(status) => f.write_str(status),
        }
    }
}

/// One delivery in a rendered route view.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DeliveryView {
    /// Displayed stop number within the driver's full route.
    pub stop_number: u32,
    /// The underlying stop.
    pub stop: Stop,
    /// Leg annotation for the stop.
    pub leg: LegInfo,
}

/// A driver's route rendered for display.
///
/// # Examples
/// ```
/// use milkrun_core::{DriverRoute, LegInfo, RouteMetadata, RoutedStop, Stop, StopId};
/// use milkrun_sequencer::{RouteView, StatusFilter};
///
/// let mut meta = RouteMetadata::empty();
/// meta.total_stops = 1;
/// let route = DriverRoute::new(
///     vec![RoutedStop {
///         stop: Stop::new(StopId(1), Some("06901".into())),
///         leg: LegInfo::estimated("1.0 mi", "5 min"),
///     }],
///     meta,
/// );
///
/// let view = RouteView::build(&route, None);
/// assert_eq!(view.deliveries.len(), 1);
/// assert_eq!(view.deliveries.first().map(|d| d.stop_number), Some(1));
///
/// let delivered = RouteView::build(&route, Some(&StatusFilter::Delivered));
/// assert!(delivered.deliveries.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RouteView {
    /// Deliveries passing the filter, in route order.
    pub deliveries: Vec<DeliveryView>,
    /// Metadata for the whole route, unaffected by filtering.
    pub route_meta: RouteMetadata,
}

impl RouteView {
    /// Render a sequenced route, optionally narrowed by a status filter.
    ///
    /// The filter narrows `deliveries` only; `route_meta` still describes
    /// the whole route.
    #[must_use]
    pub fn build(route: &DriverRoute, filter: Option<&StatusFilter>) -> Self {
        let deliveries = route
            .stops
            .iter()
            .enumerate()
            .filter(|(_, routed)| filter.is_none_or(|status| status.matches(&routed.stop)))
            .map(|(index, routed)| DeliveryView {
                stop_number: stop_number(index, routed),
                stop: routed.stop.clone(),
                leg: routed.leg.clone(),
            })
            .collect();
        Self {
            deliveries,
            route_meta: route.metadata.clone(),
        }
    }
}

/// Displayed number for the stop at `index` of the full ordered route.
///
/// Saved positions win; a stop without one falls back to its one-based
/// place in the ordered route, which for active stops equals
/// `completed_stops + active_index + 1`.
fn stop_number(index: usize, routed: &RoutedStop) -> u32 {
    routed.stop.route_position.map_or_else(
        || u32::try_from(index).unwrap_or(u32::MAX).saturating_add(1),
        RoutePosition::get,
    )
}

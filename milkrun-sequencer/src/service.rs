//! Access-controlled driver route queries.
//!
//! [`RouteService`] is the transport-agnostic entry point callers go
//! through: authorise, sequence, render. Authorisation is decided before
//! any store read, so a rejected caller learns nothing about the route, not
//! even whether it exists.

use chrono::NaiveDate;
use milkrun_core::{DistanceEstimator, DriverId, OrderStore, StopFilter};
use thiserror::Error;

use crate::sequencer::{RouteSequencer, SequenceError};
use crate::view::{RouteView, StatusFilter};

/// Identity a route query is made under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Caller {
    /// An authenticated driver.
    Driver(DriverId),
    /// An operator with elevated privileges.
    Operator,
    /// No authenticated identity.
    Anonymous,
}

impl Caller {
    /// Whether this caller may view `driver`'s route.
    ///
    /// Only the driver themselves or an operator may.
    #[must_use]
    pub fn may_view(&self, driver: DriverId) -> bool {
        match self {
            Self::Driver(id) => *id == driver,
            Self::Operator => true,
            Self::Anonymous => false,
        }
    }
}

/// Filters applied to a driver route query.
///
/// The date filter narrows the store listing; the status filter narrows the
/// rendered view after sequencing, so the route's numbering is computed
/// over the whole stop set either way.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteQuery {
    /// Exact delivery date to list, when set.
    pub date: Option<NaiveDate>,
    /// Status filter for the rendered view, when set.
    pub status: Option<StatusFilter>,
}

impl RouteQuery {
    /// A query with no filters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the delivery date filter while returning `self` for chaining.
    #[must_use]
    pub const fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    /// Set the status filter while returning `self` for chaining.
    #[must_use]
    pub fn with_status(mut self, status: StatusFilter) -> Self {
        self.status = Some(status);
        self
    }
}

/// Errors from [`RouteService::driver_route`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteQueryError {
    /// The caller may not view this route.
    #[error("caller is not authorised to view this route")]
    Unauthorized,
    /// Sequencing failed after authorisation.
    #[error("failed to sequence the driver's route")]
    Sequence {
        /// Underlying sequencing failure.
        #[from]
        source: SequenceError,
    },
}

/// Access-controlled query surface over a [`RouteSequencer`].
///
/// # Examples
/// ```
/// use milkrun_core::test_support::{MemoryOrderStore, UnitEstimator};
/// use milkrun_core::{DriverId, Stop, StopId};
/// use milkrun_sequencer::{Caller, RouteQuery, RouteService};
///
/// let store = MemoryOrderStore::with_stop(Stop::new(StopId(1), Some("06901".into())));
/// let service = RouteService::new(store, UnitEstimator);
///
/// let view = service.driver_route(&Caller::Operator, DriverId(7), &RouteQuery::new())?;
/// assert_eq!(view.deliveries.len(), 1);
/// # Ok::<(), milkrun_sequencer::RouteQueryError>(())
/// ```
pub struct RouteService<S, E>
where
    S: OrderStore,
    E: DistanceEstimator,
{
    sequencer: RouteSequencer<S, E>,
}

impl<S, E> RouteService<S, E>
where
    S: OrderStore,
    E: DistanceEstimator,
{
    /// Construct a service over a store and an estimator.
    #[must_use]
    pub fn new(store: S, estimator: E) -> Self {
        Self {
            sequencer: RouteSequencer::new(store, estimator),
        }
    }

    /// Build the route view for `driver` on behalf of `caller`.
    ///
    /// # Errors
    ///
    /// Returns [`RouteQueryError::Unauthorized`] before touching the store
    /// when the caller may not view the route, and wraps any
    /// [`SequenceError`] from the sequencing cycle.
    pub fn driver_route(
        &self,
        caller: &Caller,
        driver: DriverId,
        query: &RouteQuery,
    ) -> Result<RouteView, RouteQueryError> {
        if !caller.may_view(driver) {
            return Err(RouteQueryError::Unauthorized);
        }

        let filter = query
            .date
            .map_or_else(StopFilter::new, |date| StopFilter::new().with_date(date));
        let route = self.sequencer.route_for_driver(driver, &filter)?;
        Ok(RouteView::build(&route, query.status.as_ref()))
    }
}

//! `RouteSequencer` implementation.
//!
//! Sequencing is a read-compute-(maybe)write cycle: partition the driver's
//! stops into completed and active, reuse the saved order when every active
//! stop still has a position, otherwise recompute (pinned stops first in
//! saved-position order, then the nearest-neighbour remainder) and persist
//! the positions that changed. Position writes are fire-and-forget per
//! stop: a failed write is logged and swallowed so the computed route still
//! reaches the caller.

use milkrun_core::{
    DistanceEstimator, DriverId, DriverRoute, EstimateError, LegInfo, OrderStore, OrderStoreError,
    RouteMetadata, RoutePosition, RoutedStop, Stop, StopFilter, StopId, UNKNOWN_ZIP,
};
use thiserror::Error;

use crate::locks::DriverLocks;

mod heuristic;

/// Errors from sequencing a driver's route.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SequenceError {
    /// Reading stops from the order store failed.
    #[error("failed to read stops from the order store")]
    Store {
        /// Store failure detail.
        #[from]
        source: OrderStoreError,
    },
    /// Scoring a route leg failed.
    #[error("failed to estimate a route leg")]
    Estimate {
        /// Estimator failure detail.
        #[from]
        source: EstimateError,
    },
}

/// Sequences one driver's stops into a stable, positioned route.
///
/// The sequencer is generic over the engine boundaries: an order store for
/// reads and position writes, and a distance estimator for proximity
/// scores.
pub struct RouteSequencer<S, E>
where
    S: OrderStore,
    E: DistanceEstimator,
{
    store: S,
    estimator: E,
    locks: DriverLocks,
}

impl<S, E> RouteSequencer<S, E>
where
    S: OrderStore,
    E: DistanceEstimator,
{
    /// Construct a sequencer over a store and an estimator.
    #[must_use]
    pub fn new(store: S, estimator: E) -> Self {
        Self {
            store,
            estimator,
            locks: DriverLocks::new(),
        }
    }

    /// Sequence the route for `driver`, listing stops through `filter`.
    ///
    /// The driver's lease is held for the whole read-compute-persist cycle,
    /// so concurrent requests for one driver settle on one ordering instead
    /// of racing their position writes.
    ///
    /// # Errors
    ///
    /// Returns [`SequenceError::Store`] when the listing fails and
    /// [`SequenceError::Estimate`] when leg scoring fails. Position write
    /// failures are logged and swallowed, not returned.
    pub fn route_for_driver(
        &self,
        driver: DriverId,
        filter: &StopFilter,
    ) -> Result<DriverRoute, SequenceError> {
        self.locks.with_lease(driver, || {
            let stops = self.store.list_stops(driver, filter)?;
            self.sequence(stops)
        })
    }

    /// Sequence an already-listed collection of stops.
    ///
    /// The input order is the tie-break order for equal proximity scores.
    /// Positions newly assigned here are persisted through the store;
    /// when every active stop already has a position the saved order is
    /// reused verbatim and nothing is written.
    ///
    /// # Errors
    ///
    /// Returns [`SequenceError::Estimate`] when leg scoring fails. Position
    /// write failures are logged and swallowed, not returned.
    pub fn sequence(&self, stops: Vec<Stop>) -> Result<DriverRoute, SequenceError> {
        if stops.is_empty() {
            return Ok(DriverRoute::empty());
        }

        let (completed, active): (Vec<Stop>, Vec<Stop>) =
            stops.into_iter().partition(Stop::is_completed);
        let driver_zip = active
            .first()
            .map_or(UNKNOWN_ZIP, Stop::routing_zip)
            .to_owned();
        let completed_count = count_u32(completed.len());
        let total_stops = count_u32(completed.len().saturating_add(active.len()));

        let needs_recompute = active.iter().any(|stop| stop.route_position.is_none());
        let sequenced = if needs_recompute {
            self.recompute(&driver_zip, completed_count, active)?
        } else {
            reuse_saved_order(active)
        };

        let mut routed = annotate_completed(completed);
        routed.extend(self.annotate_active(&driver_zip, sequenced)?);

        let metadata = RouteMetadata {
            total_stops,
            completed_stops: completed_count,
            current_stop_index: 0,
            driver_zip,
        };
        Ok(DriverRoute::new(routed, metadata))
    }

    /// Re-sequence active stops and persist the positions that changed.
    ///
    /// Pinned stops (override with a saved position) lead in saved-position
    /// order; the rest, overrides without positions included, are routed by
    /// the nearest-neighbour heuristic from `driver_zip`.
    fn recompute(
        &self,
        driver_zip: &str,
        completed_count: u32,
        active: Vec<Stop>,
    ) -> Result<Vec<Stop>, SequenceError> {
        let (mut pinned, auto): (Vec<Stop>, Vec<Stop>) =
            active.into_iter().partition(Stop::is_pinned);
        pinned.sort_by_key(|stop| stop.route_position);

        let routed = heuristic::nearest_neighbor_order(&self.estimator, driver_zip, auto)?;

        let mut sequenced = pinned;
        sequenced.extend(routed);

        let changed = assign_positions(completed_count, &mut sequenced);
        self.persist_positions(&changed);
        Ok(sequenced)
    }

    /// Write changed positions back to the store, one write per stop.
    ///
    /// Writes are independent: a failure is logged and swallowed, and the
    /// remaining writes still go ahead.
    fn persist_positions(&self, changed: &[(StopId, RoutePosition)]) {
        for (stop, position) in changed {
            if let Err(error) = self.store.update_route_position(*stop, *position) {
                log::warn!("failed to persist route position {position} for stop {stop}: {error}");
            }
        }
    }

    /// Annotate sequenced active stops with leg estimates.
    ///
    /// The first leg starts at `driver_zip`; every later leg starts at the
    /// previous stop's routing zip, the sentinel included.
    fn annotate_active(
        &self,
        driver_zip: &str,
        sequenced: Vec<Stop>,
    ) -> Result<Vec<RoutedStop>, SequenceError> {
        let mut routed = Vec::with_capacity(sequenced.len());
        let mut origin = driver_zip.to_owned();
        for stop in sequenced {
            let estimate = self.estimator.estimate(&origin, stop.routing_zip())?;
            origin = stop.routing_zip().to_owned();
            routed.push(RoutedStop {
                stop,
                leg: LegInfo::estimated(estimate.display_distance, estimate.display_eta),
            });
        }
        Ok(routed)
    }
}

/// Sort active stops by their saved positions without touching the store.
fn reuse_saved_order(mut active: Vec<Stop>) -> Vec<Stop> {
    active.sort_by_key(|stop| stop.route_position);
    active
}

/// Number sequenced stops from `completed_count + 1`, collecting changes.
///
/// Every stop gets its contiguous position in memory; the returned list
/// holds only the stops whose saved position differed and therefore need a
/// store write.
fn assign_positions(completed_count: u32, stops: &mut [Stop]) -> Vec<(StopId, RoutePosition)> {
    let mut changed = Vec::new();
    let mut next = RoutePosition::MIN.saturating_add(completed_count);
    for stop in stops {
        if stop.route_position != Some(next) {
            stop.route_position = Some(next);
            changed.push((stop.id, next));
        }
        next = next.saturating_add(1);
    }
    changed
}

/// Completed stops in saved-position order, carrying the completed marker.
///
/// Stops that were never positioned sort first; the sort is stable, so they
/// keep their listing order among themselves.
fn annotate_completed(completed: Vec<Stop>) -> Vec<RoutedStop> {
    let mut ordered = completed;
    ordered.sort_by_key(|stop| stop.route_position);
    ordered
        .into_iter()
        .map(|stop| RoutedStop {
            stop,
            leg: LegInfo::Completed,
        })
        .collect()
}

/// Clamp a collection size into the metadata's `u32` space.
fn count_u32(count: usize) -> u32 {
    u32::try_from(count).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests;

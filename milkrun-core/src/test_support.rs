//! Test-only implementations of the core ports.
//!
//! The doubles in this module are available to unit tests and behavioural
//! tests across the workspace. They are gated behind the `test-support`
//! feature (and `cfg(test)`).
//!
//! The store and the scripted estimator share their state behind an [`Arc`]
//! so tests can keep a handle for assertions after moving a clone into the
//! sequencer.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use crate::{
    DistanceEstimator, DriverId, EstimateError, LegEstimate, OrderStore, OrderStoreError,
    RoutePosition, Stop, StopFilter, StopId,
};

#[derive(Default, Debug)]
struct MemoryInner {
    stops: Mutex<Vec<Stop>>,
    writes: AtomicUsize,
}

/// In-memory [`OrderStore`] used in tests.
///
/// Listing preserves insertion order, which makes the sequencer's tie-break
/// behaviour deterministic in tests. Cloning shares the underlying state.
///
/// # Examples
/// ```rust
/// use milkrun_core::test_support::MemoryOrderStore;
/// use milkrun_core::{DriverId, OrderStore, Stop, StopFilter, StopId};
///
/// let store = MemoryOrderStore::with_stops([Stop::new(StopId(1), Some("06901".into()))]);
/// let listed = store.list_stops(DriverId(1), &StopFilter::new())?;
/// assert_eq!(listed.len(), 1);
/// assert_eq!(store.write_count(), 0);
/// # Ok::<(), milkrun_core::OrderStoreError>(())
/// ```
#[derive(Default, Debug, Clone)]
pub struct MemoryOrderStore {
    inner: Arc<MemoryInner>,
}

impl MemoryOrderStore {
    /// Create a store containing a single stop.
    #[must_use]
    pub fn with_stop(stop: Stop) -> Self {
        Self::with_stops(std::iter::once(stop))
    }

    /// Create a store from a collection of stops.
    #[must_use]
    pub fn with_stops<I>(stops: I) -> Self
    where
        I: IntoIterator<Item = Stop>,
    {
        Self {
            inner: Arc::new(MemoryInner {
                stops: Mutex::new(stops.into_iter().collect()),
                writes: AtomicUsize::new(0),
            }),
        }
    }

    /// Snapshot the stored stops, persisted positions included.
    #[must_use]
    pub fn stops(&self) -> Vec<Stop> {
        self.lock_stops().clone()
    }

    /// Number of position writes attempted against this store.
    #[must_use]
    pub fn write_count(&self) -> usize {
        self.inner.writes.load(Ordering::SeqCst)
    }

    fn lock_stops(&self) -> std::sync::MutexGuard<'_, Vec<Stop>> {
        self.inner
            .stops
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl OrderStore for MemoryOrderStore {
    fn list_stops(
        &self,
        driver: DriverId,
        filter: &StopFilter,
    ) -> Result<Vec<Stop>, OrderStoreError> {
        let stops = self.lock_stops();
        Ok(stops
            .iter()
            // Unassigned stops appear in every driver's listing.
            .filter(|stop| stop.driver.is_none_or(|d| d == driver))
            .filter(|stop| filter.matches(stop))
            .cloned()
            .collect())
    }

    fn update_route_position(
        &self,
        stop: StopId,
        position: RoutePosition,
    ) -> Result<(), OrderStoreError> {
        self.inner.writes.fetch_add(1, Ordering::SeqCst);
        let mut stops = self.lock_stops();
        let target = stops
            .iter_mut()
            .find(|s| s.id == stop)
            .ok_or(OrderStoreError::StopNotFound { stop })?;
        target.route_position = Some(position);
        Ok(())
    }
}

/// Deterministic [`DistanceEstimator`] scoring every pair at `1.0`.
///
/// With every leg equally near, the sequencer falls back to listing order,
/// which keeps ordering assertions independent of any distance model.
#[derive(Default, Debug, Copy, Clone)]
pub struct UnitEstimator;

impl DistanceEstimator for UnitEstimator {
    fn estimate(
        &self,
        _origin_zip: &str,
        _destination_zip: &str,
    ) -> Result<LegEstimate, EstimateError> {
        Ok(LegEstimate {
            score: 1.0,
            display_distance: "1.0 mi".into(),
            display_eta: "5 min".into(),
        })
    }
}

#[derive(Default, Debug)]
struct ScriptedInner {
    scores: Mutex<HashMap<(String, String), f64>>,
    calls: AtomicUsize,
}

/// A [`DistanceEstimator`] returning caller-scripted scores.
///
/// This estimator enables fully deterministic golden route tests: each
/// (origin, destination) pair must be scripted with [`with_score`], and an
/// unscripted pair produces an [`EstimateError::ServiceError`] with code
/// `UNSCRIPTED_PAIR` so a test fails loudly instead of silently routing
/// through an unintended leg. Cloning shares the script and the call count.
///
/// [`with_score`]: ScriptedEstimator::with_score
///
/// # Examples
/// ```rust
/// use milkrun_core::test_support::ScriptedEstimator;
/// use milkrun_core::DistanceEstimator;
///
/// let estimator = ScriptedEstimator::new().with_score("06901", "06905", 2.0);
/// let estimate = estimator.estimate("06901", "06905")?;
/// assert_eq!(estimate.score, 2.0);
/// assert_eq!(estimator.call_count(), 1);
/// # Ok::<(), milkrun_core::EstimateError>(())
/// ```
#[derive(Default, Debug, Clone)]
pub struct ScriptedEstimator {
    inner: Arc<ScriptedInner>,
}

impl ScriptedEstimator {
    /// Create an estimator with no scripted pairs.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the score for one (origin, destination) pair.
    #[must_use]
    pub fn with_score(self, origin_zip: &str, destination_zip: &str, score: f64) -> Self {
        self.inner
            .scores
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert((origin_zip.to_owned(), destination_zip.to_owned()), score);
        self
    }

    /// Number of estimates requested from this estimator.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.inner.calls.load(Ordering::SeqCst)
    }
}

impl DistanceEstimator for ScriptedEstimator {
    fn estimate(
        &self,
        origin_zip: &str,
        destination_zip: &str,
    ) -> Result<LegEstimate, EstimateError> {
        self.inner.calls.fetch_add(1, Ordering::SeqCst);
        let scores = self
            .inner
            .scores
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let score = scores
            .get(&(origin_zip.to_owned(), destination_zip.to_owned()))
            .copied()
            .ok_or_else(|| EstimateError::ServiceError {
                code: "UNSCRIPTED_PAIR".to_owned(),
                message: format!("no scripted score for {origin_zip} -> {destination_zip}"),
            })?;
        Ok(LegEstimate {
            score,
            display_distance: format!("{score:.1} mi"),
            display_eta: format!("{score:.0} min"),
        })
    }
}

/// An [`OrderStore`] decorator that injects failures.
///
/// Wraps any store and fails reads or writes on demand, so tests can check
/// how the sequencer reports listing failures and tolerates write failures.
///
/// # Examples
/// ```rust
/// use milkrun_core::test_support::{FailingStore, MemoryOrderStore};
/// use milkrun_core::{DriverId, OrderStore, StopFilter};
///
/// let store = FailingStore::failing_reads(MemoryOrderStore::default());
/// assert!(store.list_stops(DriverId(1), &StopFilter::new()).is_err());
/// ```
#[derive(Debug, Clone)]
pub struct FailingStore<S> {
    inner: S,
    fail_reads: bool,
    fail_writes: bool,
}

impl<S: OrderStore> FailingStore<S> {
    /// Wrap `inner` so every listing fails.
    pub const fn failing_reads(inner: S) -> Self {
        Self {
            inner,
            fail_reads: true,
            fail_writes: false,
        }
    }

    /// Wrap `inner` so every position write fails.
    pub const fn failing_writes(inner: S) -> Self {
        Self {
            inner,
            fail_reads: false,
            fail_writes: true,
        }
    }
}

impl<S: OrderStore> OrderStore for FailingStore<S> {
    fn list_stops(
        &self,
        driver: DriverId,
        filter: &StopFilter,
    ) -> Result<Vec<Stop>, OrderStoreError> {
        if self.fail_reads {
            return Err(OrderStoreError::ListFailed {
                driver,
                message: "injected read failure".to_owned(),
            });
        }
        self.inner.list_stops(driver, filter)
    }

    fn update_route_position(
        &self,
        stop: StopId,
        position: RoutePosition,
    ) -> Result<(), OrderStoreError> {
        if self.fail_writes {
            return Err(OrderStoreError::UpdateFailed {
                stop,
                message: "injected write failure".to_owned(),
            });
        }
        self.inner.update_route_position(stop, position)
    }
}

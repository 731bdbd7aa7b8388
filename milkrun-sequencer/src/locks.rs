//! Per-driver sequencing leases.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use milkrun_core::DriverId;

/// Registry of per-driver leases serialising route recomputes.
///
/// Two concurrent route requests for the same driver could otherwise both
/// observe stops without positions, both run the heuristic, and interleave
/// their position writes. Holding the driver's lease across the whole
/// read-compute-persist cycle makes the second request wait and then reuse
/// the first request's persisted order. Requests for distinct drivers do
/// not contend.
///
/// A panic while a lease is held poisons only that driver's entry; the next
/// holder recovers it and proceeds.
///
/// # Examples
/// ```
/// use milkrun_core::DriverId;
/// use milkrun_sequencer::DriverLocks;
///
/// let locks = DriverLocks::new();
/// let answer = locks.with_lease(DriverId(7), || 41 + 1);
/// assert_eq!(answer, 42);
/// ```
#[derive(Debug, Default)]
pub struct DriverLocks {
    leases: Mutex<HashMap<DriverId, Arc<Mutex<()>>>>,
}

impl DriverLocks {
    /// Create an empty lease registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `action` while holding the lease for `driver`.
    ///
    /// Blocks until the lease is free. The registry mutex is only held long
    /// enough to look up or insert the driver's entry, never while `action`
    /// runs.
    #[must_use]
    pub fn with_lease<R>(&self, driver: DriverId, action: impl FnOnce() -> R) -> R {
        let lease = {
            let mut leases = self.leases.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(leases.entry(driver).or_default())
        };
        let _held = lease.lock().unwrap_or_else(PoisonError::into_inner);
        action()
    }
}

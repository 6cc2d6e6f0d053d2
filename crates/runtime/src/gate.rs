// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-boundary serialization of check-then-act
//!
//! Strategies guard single ledger operations only. A `BoundaryGate` holds
//! one mutex per boundary so `can_lock` followed by `lock` (every sub-pair
//! of a composite included) runs without a racing caller on the same
//! boundary. Different boundaries never contend.

use lockgate_core::{BoundaryId, CancellationTarget, LockConflict, LockOutcome, LockStrategy};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// A successful acquisition
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Admission {
    /// Entries the caller must cancel and unlock
    pub cancellations: Vec<CancellationTarget>,
}

impl Admission {
    pub fn preempts(&self) -> bool {
        !self.cancellations.is_empty()
    }
}

#[derive(Default)]
pub struct BoundaryGate {
    boundaries: Mutex<HashMap<BoundaryId, Arc<Mutex<()>>>>,
}

impl BoundaryGate {
    pub fn new() -> Self {
        Self::default()
    }

    fn boundary_lock(&self, boundary: &BoundaryId) -> Arc<Mutex<()>> {
        let mut boundaries = self.boundaries.lock().unwrap_or_else(|e| e.into_inner());
        Arc::clone(boundaries.entry(boundary.clone()).or_default())
    }

    /// Run `f` while holding the boundary's lock
    ///
    /// The boundary's mutex is dropped afterwards unless another caller
    /// holds or awaits it. Not re-entrant for the same boundary.
    pub fn with_boundary<R>(&self, boundary: &BoundaryId, f: impl FnOnce() -> R) -> R {
        let lock = self.boundary_lock(boundary);
        let result = {
            let _guard = lock.lock().unwrap_or_else(|e| e.into_inner());
            f()
        };
        self.release_boundary(boundary, &lock);
        result
    }

    fn release_boundary(&self, boundary: &BoundaryId, lock: &Arc<Mutex<()>>) {
        let mut boundaries = self.boundaries.lock().unwrap_or_else(|e| e.into_inner());
        // One reference in the map, one held by the caller
        let idle = boundaries
            .get(boundary)
            .is_some_and(|current| Arc::ptr_eq(current, lock) && Arc::strong_count(lock) == 2);
        if idle {
            boundaries.remove(boundary);
        }
    }

    /// `can_lock` then `lock` as one step
    ///
    /// Cancellation targets in the returned admission are not cancelled or
    /// unlocked here.
    pub fn acquire<S>(
        &self,
        strategy: &S,
        boundary: &BoundaryId,
        info: &S::Info,
    ) -> Result<Admission, LockConflict>
    where
        S: LockStrategy + ?Sized,
    {
        self.with_boundary(boundary, || {
            let admission = check(strategy, boundary, info)?;
            strategy.lock(boundary, info);
            Ok(admission)
        })
    }

    /// Drop mutexes of boundaries nobody currently holds
    ///
    /// Only needed after `f` panicked inside `with_boundary`.
    pub fn prune(&self) {
        let mut boundaries = self.boundaries.lock().unwrap_or_else(|e| e.into_inner());
        boundaries.retain(|_, lock| Arc::strong_count(lock) > 1);
    }

    pub fn tracked_boundaries(&self) -> usize {
        self.boundaries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

/// `can_lock` as a `Result`; the caller must hold the boundary
pub(crate) fn check<S>(
    strategy: &S,
    boundary: &BoundaryId,
    info: &S::Info,
) -> Result<Admission, LockConflict>
where
    S: LockStrategy + ?Sized,
{
    match strategy.can_lock(boundary, info) {
        LockOutcome::Success => Ok(Admission::default()),
        LockOutcome::SuccessWithPrecedingCancellation(cancellations) => Ok(Admission { cancellations }),
        LockOutcome::Rejected(conflict) => Err(conflict),
    }
}

#[cfg(test)]
#[path = "gate_tests.rs"]
mod tests;

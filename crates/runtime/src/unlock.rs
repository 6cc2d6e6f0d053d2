// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Deferred release of an admitted entry

pub use lockgate_core::UnlockOption;

use lockgate_core::{BoundaryId, LockInfo, LockStrategy};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Releases one admitted info exactly once
pub struct UnlockToken<S: LockStrategy + ?Sized> {
    strategy: Arc<S>,
    boundary: BoundaryId,
    info: S::Info,
    option: UnlockOption,
    released: AtomicBool,
}

impl<S: LockStrategy + ?Sized> UnlockToken<S> {
    pub fn new(strategy: Arc<S>, boundary: BoundaryId, info: S::Info, option: UnlockOption) -> Self {
        Self {
            strategy,
            boundary,
            info,
            option,
            released: AtomicBool::new(false),
        }
    }

    pub fn boundary(&self) -> &BoundaryId {
        &self.boundary
    }

    pub fn info(&self) -> &S::Info {
        &self.info
    }

    pub fn option(&self) -> UnlockOption {
        self.option
    }

    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::SeqCst)
    }

    /// Wait as the unlock option requires, then unlock
    ///
    /// Returns false if the token was already released.
    pub async fn release(&self) -> bool {
        if self.is_released() {
            return false;
        }
        match self.option {
            UnlockOption::Immediate => {}
            UnlockOption::NextCycle => tokio::task::yield_now().await,
            UnlockOption::Delayed(delay) => tokio::time::sleep(delay).await,
        }
        self.release_now()
    }

    /// Unlock without waiting
    pub fn release_now(&self) -> bool {
        if self.released.swap(true, Ordering::SeqCst) {
            return false;
        }
        self.strategy.unlock(&self.boundary, &self.info);
        tracing::debug!(
            strategy = %self.strategy.strategy_id(),
            boundary = %self.boundary,
            action_id = %self.info.action_id(),
            unique_id = %self.info.unique_id(),
            "lock released"
        );
        true
    }
}

#[cfg(test)]
#[path = "unlock_tests.rs"]
mod tests;

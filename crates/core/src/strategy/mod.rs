// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lock strategies
//!
//! A strategy interprets its own ledger to decide whether an action may
//! start in a boundary. Callers follow check-then-act:
//! - `can_lock` answers success, success-with-preceding-cancellation, or a rejection
//! - `lock` commits an info that `can_lock` admitted
//! - `unlock` releases it (idempotent)
//!
//! The pair is not atomic by itself; the execution layer serializes
//! `can_lock` + `lock` per boundary.

pub mod composite;
pub mod concurrency;
pub mod group;
pub mod priority;
pub mod single_execution;

use crate::id::BoundaryId;
use crate::info::{LockInfo, LockOutcome, LockSummary};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// Identifier a registry resolves strategies by
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StrategyId {
    pub name: String,
    /// Distinguishes differently configured instances of one strategy
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub configuration: Option<String>,
}

impl StrategyId {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            configuration: None,
        }
    }

    pub fn with_configuration(mut self, configuration: impl Into<String>) -> Self {
        self.configuration = Some(configuration.into());
        self
    }
}

impl std::fmt::Display for StrategyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.configuration {
            Some(configuration) => write!(f, "{}:{}", self.name, configuration),
            None => write!(f, "{}", self.name),
        }
    }
}

impl From<String> for StrategyId {
    fn from(s: String) -> Self {
        StrategyId::new(s)
    }
}

impl From<&str> for StrategyId {
    fn from(s: &str) -> Self {
        StrategyId::new(s)
    }
}

/// A conflict-resolution policy over a payload type
pub trait LockStrategy: Send + Sync {
    type Info: LockInfo;

    fn strategy_id(&self) -> StrategyId;

    /// Decide admission without mutating state
    fn can_lock(&self, boundary: &BoundaryId, info: &Self::Info) -> LockOutcome;

    /// Record an admitted info as active
    fn lock(&self, boundary: &BoundaryId, info: &Self::Info);

    /// Release an info; releasing an absent entry is a no-op
    fn unlock(&self, boundary: &BoundaryId, info: &Self::Info);

    /// Drop every active entry in every boundary
    fn clean_up(&self);

    /// Drop every active entry in one boundary
    fn clean_up_boundary(&self, boundary: &BoundaryId);

    /// Payload-independent view of active entries per boundary
    fn lock_snapshot(&self) -> HashMap<BoundaryId, Vec<LockSummary>>;
}

impl<S: LockStrategy + ?Sized> LockStrategy for Arc<S> {
    type Info = S::Info;

    fn strategy_id(&self) -> StrategyId {
        (**self).strategy_id()
    }

    fn can_lock(&self, boundary: &BoundaryId, info: &Self::Info) -> LockOutcome {
        (**self).can_lock(boundary, info)
    }

    fn lock(&self, boundary: &BoundaryId, info: &Self::Info) {
        (**self).lock(boundary, info)
    }

    fn unlock(&self, boundary: &BoundaryId, info: &Self::Info) {
        (**self).unlock(boundary, info)
    }

    fn clean_up(&self) {
        (**self).clean_up()
    }

    fn clean_up_boundary(&self, boundary: &BoundaryId) {
        (**self).clean_up_boundary(boundary)
    }

    fn lock_snapshot(&self) -> HashMap<BoundaryId, Vec<LockSummary>> {
        (**self).lock_snapshot()
    }
}

/// Type-erased strategy for heterogeneous storage
///
/// Exposes only the operations that do not name the payload type.
pub trait AnyLockStrategy: Send + Sync {
    fn id(&self) -> StrategyId;

    fn info_type_name(&self) -> &'static str;

    fn reset(&self);

    fn reset_boundary(&self, boundary: &BoundaryId);

    fn snapshot(&self) -> HashMap<BoundaryId, Vec<LockSummary>>;
}

impl<S: LockStrategy> AnyLockStrategy for S {
    fn id(&self) -> StrategyId {
        self.strategy_id()
    }

    fn info_type_name(&self) -> &'static str {
        std::any::type_name::<S::Info>()
    }

    fn reset(&self) {
        self.clean_up()
    }

    fn reset_boundary(&self, boundary: &BoundaryId) {
        self.clean_up_boundary(boundary)
    }

    fn snapshot(&self) -> HashMap<BoundaryId, Vec<LockSummary>> {
        self.lock_snapshot()
    }
}

/// Summaries of a ledger snapshot, for `lock_snapshot` implementations
pub(crate) fn summarize<I: LockInfo>(
    strategy_id: &StrategyId,
    entries: HashMap<BoundaryId, Vec<I>>,
) -> HashMap<BoundaryId, Vec<LockSummary>> {
    entries
        .into_iter()
        .map(|(boundary, infos)| {
            let summaries = infos
                .iter()
                .map(|info| LockSummary::of(strategy_id, info))
                .collect();
            (boundary, summaries)
        })
        .collect()
}

#[cfg(test)]
#[path = "strategy_tests.rs"]
mod tests;

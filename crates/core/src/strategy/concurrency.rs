// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Concurrency-limited strategy
//!
//! Bounds how many entries sharing a concurrency group may be active at
//! once in a boundary. The group defaults to the action id.

use super::{summarize, LockStrategy, StrategyId};
use crate::conflict::LockConflict;
use crate::id::{ActionId, BoundaryId, UniqueId};
use crate::info::{LockInfo, LockOutcome, LockSummary};
use crate::ledger::LockLedger;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConcurrencyLimit {
    #[default]
    Unlimited,
    /// At most `n` active entries; `Limited(0)` never admits
    Limited(usize),
}

impl ConcurrencyLimit {
    pub fn admits(&self, current: usize) -> bool {
        match self {
            ConcurrencyLimit::Unlimited => true,
            ConcurrencyLimit::Limited(limit) => current < *limit,
        }
    }
}

impl std::fmt::Display for ConcurrencyLimit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConcurrencyLimit::Unlimited => write!(f, "unlimited"),
            ConcurrencyLimit::Limited(limit) => write!(f, "limited({})", limit),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConcurrencyLimitedInfo {
    pub action_id: ActionId,
    pub unique_id: UniqueId,
    pub concurrency_group: String,
    pub limit: ConcurrencyLimit,
}

impl ConcurrencyLimitedInfo {
    /// Info whose concurrency group is its own action id
    pub fn new(action_id: impl Into<ActionId>, limit: ConcurrencyLimit) -> Self {
        let action_id = action_id.into();
        Self {
            concurrency_group: action_id.to_string(),
            action_id,
            unique_id: UniqueId::generate(),
            limit,
        }
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.concurrency_group = group.into();
        self
    }

    pub fn with_unique_id(mut self, unique_id: impl Into<UniqueId>) -> Self {
        self.unique_id = unique_id.into();
        self
    }
}

impl LockInfo for ConcurrencyLimitedInfo {
    fn action_id(&self) -> &ActionId {
        &self.action_id
    }

    fn unique_id(&self) -> &UniqueId {
        &self.unique_id
    }
}

pub struct ConcurrencyLimitedStrategy {
    id: StrategyId,
    ledger: LockLedger<ConcurrencyLimitedInfo, String>,
}

impl ConcurrencyLimitedStrategy {
    pub const NAME: &'static str = "concurrency_limited";

    pub fn new() -> Self {
        Self::with_id(StrategyId::new(Self::NAME))
    }

    pub fn with_id(id: StrategyId) -> Self {
        Self {
            id,
            ledger: LockLedger::new(|info: &ConcurrencyLimitedInfo| {
                vec![info.concurrency_group.clone()]
            }),
        }
    }

    /// Active entries in a concurrency group
    pub fn active_count(&self, boundary: &BoundaryId, group: &str) -> usize {
        self.ledger.count_for_key(boundary, &group.to_string())
    }

    pub fn current_locks(&self) -> HashMap<BoundaryId, Vec<ConcurrencyLimitedInfo>> {
        self.ledger.all_entries()
    }
}

impl Default for ConcurrencyLimitedStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl LockStrategy for ConcurrencyLimitedStrategy {
    type Info = ConcurrencyLimitedInfo;

    fn strategy_id(&self) -> StrategyId {
        self.id.clone()
    }

    fn can_lock(&self, boundary: &BoundaryId, info: &ConcurrencyLimitedInfo) -> LockOutcome {
        let ConcurrencyLimit::Limited(limit) = info.limit else {
            return LockOutcome::Success;
        };

        let current = self.ledger.count_for_key(boundary, &info.concurrency_group);
        if info.limit.admits(current) {
            return LockOutcome::Success;
        }

        tracing::debug!(
            strategy = %self.id,
            %boundary,
            action_id = %info.action_id,
            group = %info.concurrency_group,
            limit,
            current,
            "concurrency limit reached"
        );
        LockConflict::ConcurrencyLimitReached {
            boundary: boundary.clone(),
            group: info.concurrency_group.clone(),
            limit,
            current,
        }
        .into()
    }

    fn lock(&self, boundary: &BoundaryId, info: &ConcurrencyLimitedInfo) {
        self.ledger.add(boundary, info.clone());
    }

    fn unlock(&self, boundary: &BoundaryId, info: &ConcurrencyLimitedInfo) {
        self.ledger.remove_unique(boundary, &info.unique_id);
    }

    fn clean_up(&self) {
        self.ledger.remove_all();
    }

    fn clean_up_boundary(&self, boundary: &BoundaryId) {
        self.ledger.remove_all_in(boundary);
    }

    fn lock_snapshot(&self) -> HashMap<BoundaryId, Vec<LockSummary>> {
        summarize(&self.id, self.ledger.all_entries())
    }
}

#[cfg(test)]
#[path = "concurrency_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Single-execution strategy
//!
//! Prevents duplicate execution within a boundary:
//! - `Boundary` mode: at most one action in the boundary
//! - `Action` mode: at most one instance of each action id
//! - `None` mode: the request never conflicts, but its entry still
//!   occupies the boundary

use super::{summarize, LockStrategy, StrategyId};
use crate::conflict::LockConflict;
use crate::id::{ActionId, BoundaryId, UniqueId};
use crate::info::{LockInfo, LockOutcome, LockSummary};
use crate::ledger::LockLedger;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Granularity of exclusivity
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    None,
    #[default]
    Boundary,
    Action,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SingleExecutionInfo {
    pub action_id: ActionId,
    pub unique_id: UniqueId,
    pub mode: ExecutionMode,
}

impl SingleExecutionInfo {
    pub fn new(action_id: impl Into<ActionId>, mode: ExecutionMode) -> Self {
        Self {
            action_id: action_id.into(),
            unique_id: UniqueId::generate(),
            mode,
        }
    }

    pub fn with_unique_id(mut self, unique_id: impl Into<UniqueId>) -> Self {
        self.unique_id = unique_id.into();
        self
    }

    fn is_bypassed(&self) -> bool {
        self.mode == ExecutionMode::None
    }
}

impl LockInfo for SingleExecutionInfo {
    fn action_id(&self) -> &ActionId {
        &self.action_id
    }

    fn unique_id(&self) -> &UniqueId {
        &self.unique_id
    }

    fn is_cancellation_target(&self) -> bool {
        !self.is_bypassed()
    }
}

pub struct SingleExecutionStrategy {
    id: StrategyId,
    ledger: LockLedger<SingleExecutionInfo>,
}

impl SingleExecutionStrategy {
    pub const NAME: &'static str = "single_execution";

    pub fn new() -> Self {
        Self::with_id(StrategyId::new(Self::NAME))
    }

    pub fn with_id(id: StrategyId) -> Self {
        Self {
            id,
            ledger: LockLedger::by_action(),
        }
    }

    pub fn current_locks(&self) -> HashMap<BoundaryId, Vec<SingleExecutionInfo>> {
        self.ledger.all_entries()
    }

    fn evaluate(
        boundary: &BoundaryId,
        info: &SingleExecutionInfo,
        entries: &[SingleExecutionInfo],
    ) -> LockOutcome {
        // A bypassed request never conflicts, but its entry occupies the bucket
        match info.mode {
            ExecutionMode::None => LockOutcome::Success,
            ExecutionMode::Boundary => match entries.first() {
                Some(existing) => LockConflict::AlreadyLocked {
                    boundary: boundary.clone(),
                    existing: existing.action_id.clone(),
                }
                .into(),
                None => LockOutcome::Success,
            },
            ExecutionMode::Action => match entries.iter().find(|e| e.action_id == info.action_id) {
                Some(existing) => LockConflict::ActionAlreadyRunning {
                    boundary: boundary.clone(),
                    action: info.action_id.clone(),
                    existing: existing.unique_id.clone(),
                }
                .into(),
                None => LockOutcome::Success,
            },
        }
    }
}

impl Default for SingleExecutionStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl LockStrategy for SingleExecutionStrategy {
    type Info = SingleExecutionInfo;

    fn strategy_id(&self) -> StrategyId {
        self.id.clone()
    }

    fn can_lock(&self, boundary: &BoundaryId, info: &SingleExecutionInfo) -> LockOutcome {
        let outcome = self
            .ledger
            .inspect(boundary, |entries| Self::evaluate(boundary, info, entries));

        if let LockOutcome::Rejected(conflict) = &outcome {
            tracing::debug!(
                strategy = %self.id,
                %boundary,
                action_id = %info.action_id,
                reason = conflict.name(),
                "lock denied"
            );
        }
        outcome
    }

    fn lock(&self, boundary: &BoundaryId, info: &SingleExecutionInfo) {
        self.ledger.add(boundary, info.clone());
    }

    /// Releases every entry of the action, not only this acquisition
    fn unlock(&self, boundary: &BoundaryId, info: &SingleExecutionInfo) {
        self.ledger.remove_by_key(boundary, &info.action_id);
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
#[path = "single_execution_tests.rs"]
mod tests;

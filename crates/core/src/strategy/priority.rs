// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Priority-based strategy
//!
//! Higher priority preempts lower priority; lower priority is rejected.
//! Same-level conflicts are settled by the behavior the *existing* entry
//! declared: `Exclusive` keeps its slot, `Replaceable` yields.
//!
//! The reference entry is the most recently locked entry whose priority is
//! not `None`. `None`-priority actions bypass the strategy entirely.

use super::{summarize, LockStrategy, StrategyId};
use crate::conflict::LockConflict;
use crate::id::{ActionId, BoundaryId, UniqueId};
use crate::info::{LockInfo, LockOutcome, LockSummary};
use crate::ledger::LockLedger;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;

/// How an entry reacts to a same-level newcomer
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConcurrencyBehavior {
    Exclusive,
    Replaceable,
}

impl std::fmt::Display for ConcurrencyBehavior {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConcurrencyBehavior::Exclusive => write!(f, "exclusive"),
            ConcurrencyBehavior::Replaceable => write!(f, "replaceable"),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    #[default]
    None,
    Low(ConcurrencyBehavior),
    High(ConcurrencyBehavior),
}

impl Priority {
    /// Ordering level; `None` < `Low` < `High`
    pub fn level(&self) -> u8 {
        match self {
            Priority::None => 0,
            Priority::Low(_) => 1,
            Priority::High(_) => 2,
        }
    }

    pub fn behavior(&self) -> Option<ConcurrencyBehavior> {
        match self {
            Priority::None => None,
            Priority::Low(behavior) | Priority::High(behavior) => Some(*behavior),
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Priority::None)
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Priority::None => write!(f, "none"),
            Priority::Low(behavior) => write!(f, "low({})", behavior),
            Priority::High(behavior) => write!(f, "high({})", behavior),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PriorityInfo {
    pub action_id: ActionId,
    pub unique_id: UniqueId,
    pub priority: Priority,
}

impl PriorityInfo {
    pub fn new(action_id: impl Into<ActionId>, priority: Priority) -> Self {
        Self {
            action_id: action_id.into(),
            unique_id: UniqueId::generate(),
            priority,
        }
    }

    pub fn with_unique_id(mut self, unique_id: impl Into<UniqueId>) -> Self {
        self.unique_id = unique_id.into();
        self
    }
}

impl LockInfo for PriorityInfo {
    fn action_id(&self) -> &ActionId {
        &self.action_id
    }

    fn unique_id(&self) -> &UniqueId {
        &self.unique_id
    }

    fn is_cancellation_target(&self) -> bool {
        !self.priority.is_none()
    }
}

pub struct PriorityBasedStrategy {
    id: StrategyId,
    ledger: LockLedger<PriorityInfo>,
}

impl PriorityBasedStrategy {
    pub const NAME: &'static str = "priority_based";

    pub fn new() -> Self {
        Self::with_id(StrategyId::new(Self::NAME))
    }

    pub fn with_id(id: StrategyId) -> Self {
        Self {
            id,
            ledger: LockLedger::by_action(),
        }
    }

    pub fn current_locks(&self) -> HashMap<BoundaryId, Vec<PriorityInfo>> {
        self.ledger.all_entries()
    }

    fn evaluate(boundary: &BoundaryId, info: &PriorityInfo, entries: &[PriorityInfo]) -> LockOutcome {
        if info.priority.is_none() {
            return LockOutcome::Success;
        }

        let Some(reference) = entries.iter().rev().find(|e| !e.priority.is_none()) else {
            return LockOutcome::Success;
        };

        match info.priority.level().cmp(&reference.priority.level()) {
            Ordering::Less => LockConflict::HigherPriorityExists {
                boundary: boundary.clone(),
                requested: info.priority,
                existing: reference.action_id.clone(),
                existing_priority: reference.priority,
            }
            .into(),
            Ordering::Greater => LockOutcome::preceding(boundary, reference),
            Ordering::Equal => match reference.priority.behavior() {
                Some(ConcurrencyBehavior::Replaceable) => LockOutcome::preceding(boundary, reference),
                Some(ConcurrencyBehavior::Exclusive) | None => {
                    LockConflict::SamePriorityConflict {
                        boundary: boundary.clone(),
                        priority: reference.priority,
                        existing: reference.action_id.clone(),
                    }
                    .into()
                }
            },
        }
    }
}

impl Default for PriorityBasedStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl LockStrategy for PriorityBasedStrategy {
    type Info = PriorityInfo;

    fn strategy_id(&self) -> StrategyId {
        self.id.clone()
    }

    fn can_lock(&self, boundary: &BoundaryId, info: &PriorityInfo) -> LockOutcome {
        let outcome = self
            .ledger
            .inspect(boundary, |entries| Self::evaluate(boundary, info, entries));

        match &outcome {
            LockOutcome::Rejected(conflict) => tracing::debug!(
                strategy = %self.id,
                %boundary,
                action_id = %info.action_id,
                priority = %info.priority,
                reason = conflict.name(),
                "lock denied"
            ),
            LockOutcome::SuccessWithPrecedingCancellation(targets) => tracing::debug!(
                strategy = %self.id,
                %boundary,
                action_id = %info.action_id,
                priority = %info.priority,
                preempts = ?targets.iter().map(|t| t.action_id.as_str()).collect::<Vec<_>>(),
                "lock preempts"
            ),
            LockOutcome::Success => {}
        }
        outcome
    }

    fn lock(&self, boundary: &BoundaryId, info: &PriorityInfo) {
        self.ledger.add(boundary, info.clone());
    }

    fn unlock(&self, boundary: &BoundaryId, info: &PriorityInfo) {
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
#[path = "priority_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lock payloads and admission outcomes

use crate::conflict::LockConflict;
use crate::id::{ActionId, BoundaryId, UniqueId};
use crate::strategy::StrategyId;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Payload submitted to a strategy
///
/// Strategies hold a clone of the info in their ledger while it is active.
pub trait LockInfo: Clone + Debug + Send + Sync + 'static {
    fn action_id(&self) -> &ActionId;

    fn unique_id(&self) -> &UniqueId;

    /// Whether the execution layer may cancel this action when a later
    /// admission names it for preceding cancellation
    fn is_cancellation_target(&self) -> bool {
        true
    }

    /// Every unique id a cancellation target may name for this info
    ///
    /// Composite infos answer to their own id and to each sub-info's id.
    fn unique_ids(&self) -> Vec<UniqueId> {
        vec![self.unique_id().clone()]
    }
}

/// An active entry that must yield to a newly admitted one
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CancellationTarget {
    pub boundary_id: BoundaryId,
    pub action_id: ActionId,
    pub unique_id: UniqueId,
}

impl CancellationTarget {
    pub fn of(boundary_id: &BoundaryId, info: &impl LockInfo) -> Self {
        Self {
            boundary_id: boundary_id.clone(),
            action_id: info.action_id().clone(),
            unique_id: info.unique_id().clone(),
        }
    }
}

/// Result of `can_lock`
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LockOutcome {
    /// The action may start
    Success,
    /// The action may start once the named entries are cancelled
    SuccessWithPrecedingCancellation(Vec<CancellationTarget>),
    /// The action must not start
    Rejected(LockConflict),
}

impl LockOutcome {
    pub fn preceding(boundary_id: &BoundaryId, info: &impl LockInfo) -> Self {
        LockOutcome::SuccessWithPrecedingCancellation(vec![CancellationTarget::of(
            boundary_id,
            info,
        )])
    }

    pub fn is_admitted(&self) -> bool {
        !matches!(self, LockOutcome::Rejected(_))
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, LockOutcome::Rejected(_))
    }

    /// Entries named for cancellation (empty unless preempting)
    pub fn cancellation_targets(&self) -> &[CancellationTarget] {
        match self {
            LockOutcome::SuccessWithPrecedingCancellation(targets) => targets,
            _ => &[],
        }
    }

    pub fn conflict(&self) -> Option<&LockConflict> {
        match self {
            LockOutcome::Rejected(conflict) => Some(conflict),
            _ => None,
        }
    }

    /// Convert to a `Result`, keeping the cancellation targets on success
    pub fn into_result(self) -> Result<Vec<CancellationTarget>, LockConflict> {
        match self {
            LockOutcome::Success => Ok(Vec::new()),
            LockOutcome::SuccessWithPrecedingCancellation(targets) => Ok(targets),
            LockOutcome::Rejected(conflict) => Err(conflict),
        }
    }
}

impl From<LockConflict> for LockOutcome {
    fn from(conflict: LockConflict) -> Self {
        LockOutcome::Rejected(conflict)
    }
}

/// Payload-independent view of an active entry, for snapshots
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockSummary {
    pub strategy_id: StrategyId,
    pub action_id: ActionId,
    pub unique_id: UniqueId,
    pub is_cancellation_target: bool,
}

impl LockSummary {
    pub fn of(strategy_id: &StrategyId, info: &impl LockInfo) -> Self {
        Self {
            strategy_id: strategy_id.clone(),
            action_id: info.action_id().clone(),
            unique_id: info.unique_id().clone(),
            is_cancellation_target: info.is_cancellation_target(),
        }
    }
}

#[cfg(test)]
#[path = "info_tests.rs"]
mod tests;

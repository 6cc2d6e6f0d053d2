// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Rejection reasons returned by `can_lock`
//!
//! Rejections are an expected branch, not a fault. Each variant carries the
//! boundary and the offending entry or group so callers can report it
//! without re-reading the ledger.

use crate::id::{ActionId, BoundaryId, GroupId, UniqueId};
use crate::strategy::group::LeaderEntryPolicy;
use crate::strategy::priority::Priority;
use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LockConflict {
    #[error("boundary '{boundary}' is already locked by '{existing}'")]
    AlreadyLocked {
        boundary: BoundaryId,
        existing: ActionId,
    },

    #[error("action '{action}' is already running in boundary '{boundary}'")]
    ActionAlreadyRunning {
        boundary: BoundaryId,
        action: ActionId,
        /// Acquisition currently holding the action
        existing: UniqueId,
    },

    #[error("'{existing}' holds {existing_priority} in boundary '{boundary}', above requested {requested}")]
    HigherPriorityExists {
        boundary: BoundaryId,
        requested: Priority,
        existing: ActionId,
        existing_priority: Priority,
    },

    #[error("'{existing}' holds exclusive {priority} in boundary '{boundary}'")]
    SamePriorityConflict {
        boundary: BoundaryId,
        priority: Priority,
        existing: ActionId,
    },

    #[error("concurrency group '{group}' in boundary '{boundary}' is full ({current}/{limit})")]
    ConcurrencyLimitReached {
        boundary: BoundaryId,
        group: String,
        limit: usize,
        current: usize,
    },

    #[error("leader '{action}' cannot join non-empty group(s) [{}] in boundary '{boundary}'", join_groups(.groups))]
    LeaderCannotJoinNonEmptyGroup {
        boundary: BoundaryId,
        action: ActionId,
        groups: Vec<GroupId>,
    },

    #[error("member '{action}' cannot join empty group(s) [{}] in boundary '{boundary}'", join_groups(.groups))]
    MemberCannotJoinEmptyGroup {
        boundary: BoundaryId,
        action: ActionId,
        groups: Vec<GroupId>,
    },

    #[error("action '{action}' is already in group(s) [{}] in boundary '{boundary}'", join_groups(.groups))]
    ActionAlreadyInGroup {
        boundary: BoundaryId,
        action: ActionId,
        groups: Vec<GroupId>,
    },

    #[error("leader '{action}' ({entry_policy}) is blocked by leader '{leader}' in group '{group}' in boundary '{boundary}'")]
    BlockedByExclusiveLeader {
        boundary: BoundaryId,
        action: ActionId,
        group: GroupId,
        leader: ActionId,
        entry_policy: LeaderEntryPolicy,
    },
}

impl LockConflict {
    pub fn boundary(&self) -> &BoundaryId {
        match self {
            LockConflict::AlreadyLocked { boundary, .. }
            | LockConflict::ActionAlreadyRunning { boundary, .. }
            | LockConflict::HigherPriorityExists { boundary, .. }
            | LockConflict::SamePriorityConflict { boundary, .. }
            | LockConflict::ConcurrencyLimitReached { boundary, .. }
            | LockConflict::LeaderCannotJoinNonEmptyGroup { boundary, .. }
            | LockConflict::MemberCannotJoinEmptyGroup { boundary, .. }
            | LockConflict::ActionAlreadyInGroup { boundary, .. }
            | LockConflict::BlockedByExclusiveLeader { boundary, .. } => boundary,
        }
    }

    /// Stable name for logging
    pub fn name(&self) -> &'static str {
        match self {
            LockConflict::AlreadyLocked { .. } => "already_locked",
            LockConflict::ActionAlreadyRunning { .. } => "action_already_running",
            LockConflict::HigherPriorityExists { .. } => "higher_priority_exists",
            LockConflict::SamePriorityConflict { .. } => "same_priority_conflict",
            LockConflict::ConcurrencyLimitReached { .. } => "concurrency_limit_reached",
            LockConflict::LeaderCannotJoinNonEmptyGroup { .. } => {
                "leader_cannot_join_non_empty_group"
            }
            LockConflict::MemberCannotJoinEmptyGroup { .. } => "member_cannot_join_empty_group",
            LockConflict::ActionAlreadyInGroup { .. } => "action_already_in_group",
            LockConflict::BlockedByExclusiveLeader { .. } => "blocked_by_exclusive_leader",
        }
    }
}

fn join_groups(groups: &[GroupId]) -> String {
    groups
        .iter()
        .map(GroupId::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
#[path = "conflict_tests.rs"]
mod tests;

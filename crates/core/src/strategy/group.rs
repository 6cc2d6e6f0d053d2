// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Group-coordination strategy
//!
//! Actions join one or more named groups as leaders or members. An entry
//! is admitted only if every group it names satisfies its role:
//!
//! | Role | Requirement per group |
//! |---|---|
//! | `None` | always satisfied |
//! | `Leader(EmptyGroup)` | no participants |
//! | `Leader(WithoutMembers)` | no `Member` participants |
//! | `Leader(WithoutLeader)` | no `Leader` participants |
//! | `Member` | at least one participant |
//!
//! Independently of role, an action may not appear twice in one group.

use super::{summarize, LockStrategy, StrategyId};
use crate::conflict::LockConflict;
use crate::id::{ActionId, BoundaryId, GroupId, UniqueId};
use crate::info::{LockInfo, LockOutcome, LockSummary};
use crate::ledger::LockLedger;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Maximum number of groups a single info may name
pub const MAX_GROUPS: usize = 5;

/// Condition a leader's groups must meet for the leader to join
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaderEntryPolicy {
    EmptyGroup,
    WithoutMembers,
    WithoutLeader,
}

impl std::fmt::Display for LeaderEntryPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LeaderEntryPolicy::EmptyGroup => write!(f, "empty_group"),
            LeaderEntryPolicy::WithoutMembers => write!(f, "without_members"),
            LeaderEntryPolicy::WithoutLeader => write!(f, "without_leader"),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupRole {
    #[default]
    None,
    Leader(LeaderEntryPolicy),
    Member,
}

impl GroupRole {
    pub fn is_leader(&self) -> bool {
        matches!(self, GroupRole::Leader(_))
    }

    pub fn is_member(&self) -> bool {
        matches!(self, GroupRole::Member)
    }
}

/// Errors building a [`GroupCoordinatedInfo`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GroupInfoError {
    #[error("at least one group id is required")]
    NoGroups,
    #[error("{count} group ids given, at most {max} allowed")]
    TooManyGroups { count: usize, max: usize },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GroupCoordinatedInfo {
    pub action_id: ActionId,
    pub unique_id: UniqueId,
    group_ids: Vec<GroupId>,
    pub role: GroupRole,
}

impl GroupCoordinatedInfo {
    /// Info participating in a single group
    pub fn new(action_id: impl Into<ActionId>, group_id: impl Into<GroupId>, role: GroupRole) -> Self {
        Self {
            action_id: action_id.into(),
            unique_id: UniqueId::generate(),
            group_ids: vec![group_id.into()],
            role,
        }
    }

    /// Info participating in 1 to [`MAX_GROUPS`] distinct groups
    ///
    /// Duplicate ids are collapsed, keeping first-seen order.
    pub fn with_groups<G: Into<GroupId>>(
        action_id: impl Into<ActionId>,
        group_ids: impl IntoIterator<Item = G>,
        role: GroupRole,
    ) -> Result<Self, GroupInfoError> {
        let mut unique: Vec<GroupId> = Vec::new();
        for group_id in group_ids {
            let group_id = group_id.into();
            if !unique.contains(&group_id) {
                unique.push(group_id);
            }
        }

        if unique.is_empty() {
            return Err(GroupInfoError::NoGroups);
        }
        if unique.len() > MAX_GROUPS {
            return Err(GroupInfoError::TooManyGroups {
                count: unique.len(),
                max: MAX_GROUPS,
            });
        }

        Ok(Self {
            action_id: action_id.into(),
            unique_id: UniqueId::generate(),
            group_ids: unique,
            role,
        })
    }

    pub fn with_unique_id(mut self, unique_id: impl Into<UniqueId>) -> Self {
        self.unique_id = unique_id.into();
        self
    }

    pub fn group_ids(&self) -> &[GroupId] {
        &self.group_ids
    }

    fn in_group(&self, group_id: &GroupId) -> bool {
        self.group_ids.contains(group_id)
    }
}

impl LockInfo for GroupCoordinatedInfo {
    fn action_id(&self) -> &ActionId {
        &self.action_id
    }

    fn unique_id(&self) -> &UniqueId {
        &self.unique_id
    }
}

pub struct GroupCoordinationStrategy {
    id: StrategyId,
    ledger: LockLedger<GroupCoordinatedInfo, GroupId>,
}

impl GroupCoordinationStrategy {
    pub const NAME: &'static str = "group_coordination";

    pub fn new() -> Self {
        Self::with_id(StrategyId::new(Self::NAME))
    }

    pub fn with_id(id: StrategyId) -> Self {
        Self {
            id,
            ledger: LockLedger::new(|info: &GroupCoordinatedInfo| info.group_ids.clone()),
        }
    }

    /// Participants of one group, in join order
    pub fn participants(&self, boundary: &BoundaryId, group_id: &GroupId) -> Vec<GroupCoordinatedInfo> {
        self.ledger.entries_for_key(boundary, group_id)
    }

    /// Groups with at least one participant
    pub fn active_groups(&self, boundary: &BoundaryId) -> Vec<GroupId> {
        self.ledger.keys(boundary)
    }

    pub fn current_locks(&self) -> HashMap<BoundaryId, Vec<GroupCoordinatedInfo>> {
        self.ledger.all_entries()
    }

    fn evaluate(
        boundary: &BoundaryId,
        info: &GroupCoordinatedInfo,
        entries: &[GroupCoordinatedInfo],
    ) -> LockOutcome {
        let participants = move |group_id: &GroupId| {
            let group_id = group_id.clone();
            entries.iter().filter(move |e| e.in_group(&group_id))
        };

        let already_in: Vec<GroupId> = info
            .group_ids
            .iter()
            .filter(|g| participants(*g).any(|e| e.action_id == info.action_id))
            .cloned()
            .collect();
        if !already_in.is_empty() {
            return LockConflict::ActionAlreadyInGroup {
                boundary: boundary.clone(),
                action: info.action_id.clone(),
                groups: already_in,
            }
            .into();
        }

        let failing = |violates: &dyn Fn(&GroupId) -> bool| -> Vec<GroupId> {
            info.group_ids
                .iter()
                .filter(|g| violates(*g))
                .cloned()
                .collect()
        };

        match info.role {
            GroupRole::None => LockOutcome::Success,

            GroupRole::Leader(LeaderEntryPolicy::EmptyGroup) => {
                let groups = failing(&|g: &GroupId| participants(g).next().is_some());
                Self::leader_outcome(boundary, info, groups)
            }

            GroupRole::Leader(LeaderEntryPolicy::WithoutMembers) => {
                let groups = failing(&|g: &GroupId| participants(g).any(|e| e.role.is_member()));
                Self::leader_outcome(boundary, info, groups)
            }

            GroupRole::Leader(entry_policy @ LeaderEntryPolicy::WithoutLeader) => {
                let blocking = info.group_ids.iter().find_map(|g| {
                    participants(g)
                        .find(|e| e.role.is_leader())
                        .map(|leader| (g.clone(), leader.action_id.clone()))
                });
                match blocking {
                    Some((group, leader)) => LockConflict::BlockedByExclusiveLeader {
                        boundary: boundary.clone(),
                        action: info.action_id.clone(),
                        group,
                        leader,
                        entry_policy,
                    }
                    .into(),
                    None => LockOutcome::Success,
                }
            }

            GroupRole::Member => {
                let groups = failing(&|g: &GroupId| participants(g).next().is_none());
                if groups.is_empty() {
                    LockOutcome::Success
                } else {
                    LockConflict::MemberCannotJoinEmptyGroup {
                        boundary: boundary.clone(),
                        action: info.action_id.clone(),
                        groups,
                    }
                    .into()
                }
            }
        }
    }

    fn leader_outcome(
        boundary: &BoundaryId,
        info: &GroupCoordinatedInfo,
        groups: Vec<GroupId>,
    ) -> LockOutcome {
        if groups.is_empty() {
            LockOutcome::Success
        } else {
            LockConflict::LeaderCannotJoinNonEmptyGroup {
                boundary: boundary.clone(),
                action: info.action_id.clone(),
                groups,
            }
            .into()
        }
    }
}

impl Default for GroupCoordinationStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl LockStrategy for GroupCoordinationStrategy {
    type Info = GroupCoordinatedInfo;

    fn strategy_id(&self) -> StrategyId {
        self.id.clone()
    }

    fn can_lock(&self, boundary: &BoundaryId, info: &GroupCoordinatedInfo) -> LockOutcome {
        let outcome = self
            .ledger
            .inspect(boundary, |entries| Self::evaluate(boundary, info, entries));

        if let LockOutcome::Rejected(conflict) = &outcome {
            tracing::debug!(
                strategy = %self.id,
                %boundary,
                action_id = %info.action_id,
                role = ?info.role,
                reason = conflict.name(),
                "lock denied"
            );
        }
        outcome
    }

    fn lock(&self, boundary: &BoundaryId, info: &GroupCoordinatedInfo) {
        self.ledger.add(boundary, info.clone());
    }

    /// Deregisters every entry of the action from the info's groups
    fn unlock(&self, boundary: &BoundaryId, info: &GroupCoordinatedInfo) {
        self.ledger.remove_where(boundary, |e| {
            e.action_id == info.action_id && e.group_ids.iter().any(|g| info.in_group(g))
        });
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
#[path = "group_tests.rs"]
mod tests;

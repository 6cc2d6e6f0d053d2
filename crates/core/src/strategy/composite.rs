// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Composite strategies of arity 2 to 5
//!
//! A composite evaluates its sub-strategies in declared order, each
//! against its own sub-info. The first rejection rejects the composite
//! before anything is mutated, so `lock` may commit every sub-info
//! without rollback. Cancellation targets from all sub-strategies are
//! merged.

use super::{LockStrategy, StrategyId};
use crate::id::{ActionId, BoundaryId, UniqueId};
use crate::info::{CancellationTarget, LockInfo, LockOutcome, LockSummary};
use std::collections::HashMap;

/// Name shared by every composite strategy id
pub const COMPOSITE_NAME: &str = "composite";

fn merge_targets(into: &mut Vec<CancellationTarget>, found: Vec<CancellationTarget>) {
    for target in found {
        if !into.contains(&target) {
            into.push(target);
        }
    }
}

fn merge_snapshot(
    into: &mut HashMap<BoundaryId, Vec<LockSummary>>,
    snapshot: HashMap<BoundaryId, Vec<LockSummary>>,
) {
    for (boundary, summaries) in snapshot {
        into.entry(boundary).or_default().extend(summaries);
    }
}

macro_rules! composite_strategy {
    (
        $(#[$meta:meta])*
        $strategy:ident, $info:ident;
        $($field:ident: $S:ident / $I:ident),+
    ) => {
        /// Sub-infos of one composite admission under an outer action
        #[derive(Clone, Debug, PartialEq, Eq)]
        pub struct $info<$($I),+> {
            pub action_id: ActionId,
            pub unique_id: UniqueId,
            $(pub $field: $I,)+
        }

        impl<$($I: LockInfo),+> $info<$($I),+> {
            pub fn new(action_id: impl Into<ActionId>, $($field: $I),+) -> Self {
                Self {
                    action_id: action_id.into(),
                    unique_id: UniqueId::generate(),
                    $($field,)+
                }
            }

            pub fn with_unique_id(mut self, unique_id: impl Into<UniqueId>) -> Self {
                self.unique_id = unique_id.into();
                self
            }
        }

        impl<$($I: LockInfo),+> LockInfo for $info<$($I),+> {
            fn action_id(&self) -> &ActionId {
                &self.action_id
            }

            fn unique_id(&self) -> &UniqueId {
                &self.unique_id
            }

            fn is_cancellation_target(&self) -> bool {
                false $(|| self.$field.is_cancellation_target())+
            }

            fn unique_ids(&self) -> Vec<UniqueId> {
                let mut ids = vec![self.unique_id.clone()];
                $(ids.extend(self.$field.unique_ids());)+
                ids
            }
        }

        $(#[$meta])*
        pub struct $strategy<$($S),+> {
            id: StrategyId,
            $($field: $S,)+
        }

        impl<$($S: LockStrategy),+> $strategy<$($S),+> {
            pub const NAME: &'static str = COMPOSITE_NAME;

            /// Composite whose id configuration joins the sub-ids with `+`
            pub fn new($($field: $S),+) -> Self {
                let configuration = [$($field.strategy_id().to_string()),+].join("+");
                Self::with_id(
                    StrategyId::new(COMPOSITE_NAME).with_configuration(configuration),
                    $($field),+
                )
            }

            pub fn with_id(id: StrategyId, $($field: $S),+) -> Self {
                Self { id, $($field,)+ }
            }

            $(
                pub fn $field(&self) -> &$S {
                    &self.$field
                }
            )+
        }

        impl<$($S: LockStrategy),+> LockStrategy for $strategy<$($S),+> {
            type Info = $info<$(<$S as LockStrategy>::Info),+>;

            fn strategy_id(&self) -> StrategyId {
                self.id.clone()
            }

            fn can_lock(&self, boundary: &BoundaryId, info: &Self::Info) -> LockOutcome {
                let mut targets = Vec::new();
                $(
                    match self.$field.can_lock(boundary, &info.$field) {
                        LockOutcome::Success => {}
                        LockOutcome::SuccessWithPrecedingCancellation(found) => {
                            merge_targets(&mut targets, found);
                        }
                        LockOutcome::Rejected(conflict) => {
                            tracing::debug!(
                                strategy = %self.id,
                                sub_strategy = %self.$field.strategy_id(),
                                %boundary,
                                action_id = %info.action_id,
                                reason = conflict.name(),
                                "lock denied"
                            );
                            return LockOutcome::Rejected(conflict);
                        }
                    }
                )+

                if targets.is_empty() {
                    LockOutcome::Success
                } else {
                    LockOutcome::SuccessWithPrecedingCancellation(targets)
                }
            }

            fn lock(&self, boundary: &BoundaryId, info: &Self::Info) {
                $(self.$field.lock(boundary, &info.$field);)+
            }

            fn unlock(&self, boundary: &BoundaryId, info: &Self::Info) {
                $(self.$field.unlock(boundary, &info.$field);)+
            }

            fn clean_up(&self) {
                $(self.$field.clean_up();)+
            }

            fn clean_up_boundary(&self, boundary: &BoundaryId) {
                $(self.$field.clean_up_boundary(boundary);)+
            }

            fn lock_snapshot(&self) -> HashMap<BoundaryId, Vec<LockSummary>> {
                let mut snapshot = HashMap::new();
                $(merge_snapshot(&mut snapshot, self.$field.lock_snapshot());)+
                snapshot
            }
        }
    };
}

composite_strategy!(
    /// Two strategies admitted as one unit
    CompositeStrategy2, CompositeInfo2;
    first: S1 / I1,
    second: S2 / I2
);

composite_strategy!(
    CompositeStrategy3, CompositeInfo3;
    first: S1 / I1,
    second: S2 / I2,
    third: S3 / I3
);

composite_strategy!(
    CompositeStrategy4, CompositeInfo4;
    first: S1 / I1,
    second: S2 / I2,
    third: S3 / I3,
    fourth: S4 / I4
);

composite_strategy!(
    CompositeStrategy5, CompositeInfo5;
    first: S1 / I1,
    second: S2 / I2,
    third: S3 / I3,
    fourth: S4 / I4,
    fifth: S5 / I5
);

#[cfg(test)]
#[path = "composite_tests.rs"]
mod tests;

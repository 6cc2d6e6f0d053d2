//! Composite specs

use crate::prelude::*;
use std::sync::Arc;

#[test]
fn rejecting_sub_strategy_leaves_every_ledger_untouched() {
    let single = Arc::new(SingleExecutionStrategy::new());
    let limited = Arc::new(ConcurrencyLimitedStrategy::new());
    let groups = Arc::new(GroupCoordinationStrategy::new());
    let composite = CompositeStrategy3::new(Arc::clone(&single), Arc::clone(&limited), Arc::clone(&groups));

    let info = CompositeInfo3::new(
        "export",
        SingleExecutionInfo::new("export", ExecutionMode::Action),
        ConcurrencyLimitedInfo::new("export", ConcurrencyLimit::Limited(1)),
        GroupCoordinatedInfo::new("export", "jobs", GroupRole::Member),
    );

    let outcome = composite.can_lock(&b("B1"), &info);

    assert_eq!(
        outcome.conflict().map(LockConflict::name),
        Some("member_cannot_join_empty_group")
    );
    assert!(composite.lock_snapshot().is_empty());
    assert!(single.current_locks().is_empty());
    assert!(limited.current_locks().is_empty());
    assert!(groups.current_locks().is_empty());
}

#[test]
fn admitted_composite_locks_every_sub_strategy() {
    let composite = CompositeStrategy2::new(SingleExecutionStrategy::new(), PriorityBasedStrategy::new());
    let info = CompositeInfo2::new(
        "export",
        SingleExecutionInfo::new("export", ExecutionMode::Action),
        PriorityInfo::new("export", Priority::Low(ConcurrencyBehavior::Exclusive)),
    );

    assert!(composite.can_lock(&b("B1"), &info).is_admitted());
    composite.lock(&b("B1"), &info);

    let names: Vec<String> = composite.lock_snapshot()[&b("B1")]
        .iter()
        .map(|s| s.strategy_id.to_string())
        .collect();
    similar_asserts::assert_eq!(names, vec!["single_execution", "priority_based"]);
}

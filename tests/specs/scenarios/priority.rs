//! Priority-based specs

use crate::prelude::*;

#[test]
fn high_priority_preempts_low() {
    let strategy = PriorityBasedStrategy::new();
    let low = PriorityInfo::new("sync", Priority::Low(ConcurrencyBehavior::Exclusive));
    strategy.lock(&b("B1"), &low);

    let outcome = strategy.can_lock(
        &b("B1"),
        &PriorityInfo::new("save", Priority::High(ConcurrencyBehavior::Exclusive)),
    );

    assert_eq!(
        outcome.cancellation_targets(),
        &[CancellationTarget {
            boundary_id: b("B1"),
            action_id: ActionId::new("sync"),
            unique_id: low.unique_id.clone(),
        }]
    );
}

#[test]
fn existing_exclusive_wins_same_level() {
    let strategy = PriorityBasedStrategy::new();
    strategy.lock(
        &b("B1"),
        &PriorityInfo::new("first", Priority::High(ConcurrencyBehavior::Exclusive)),
    );

    let outcome = strategy.can_lock(
        &b("B1"),
        &PriorityInfo::new("second", Priority::High(ConcurrencyBehavior::Replaceable)),
    );

    assert_eq!(outcome.conflict().map(LockConflict::name), Some("same_priority_conflict"));
}

#[test]
fn existing_replaceable_yields_same_level() {
    let strategy = PriorityBasedStrategy::new();
    let first = PriorityInfo::new("first", Priority::High(ConcurrencyBehavior::Replaceable));
    strategy.lock(&b("B1"), &first);

    let outcome = strategy.can_lock(
        &b("B1"),
        &PriorityInfo::new("second", Priority::High(ConcurrencyBehavior::Exclusive)),
    );

    assert_eq!(outcome, LockOutcome::preceding(&b("B1"), &first));
}

#[test]
fn unlock_matches_the_exact_acquisition() {
    let strategy = PriorityBasedStrategy::new();
    let first = PriorityInfo::new("sync", Priority::Low(ConcurrencyBehavior::Exclusive));
    let second = PriorityInfo::new("sync", Priority::Low(ConcurrencyBehavior::Exclusive));
    strategy.lock(&b("B1"), &first);
    strategy.lock(&b("B1"), &second);

    strategy.unlock(&b("B1"), &first);

    assert_eq!(strategy.current_locks()[&b("B1")], vec![second]);
}

//! Concurrency-limited specs

use crate::prelude::*;

#[test]
fn limit_of_two_frees_a_slot_on_unlock() {
    let strategy = ConcurrencyLimitedStrategy::new();
    let entry = |action: &str| {
        ConcurrencyLimitedInfo::new(action, ConcurrencyLimit::Limited(2)).with_group("g")
    };
    let (a, bb, c) = (entry("A"), entry("B"), entry("C"));

    for info in [&a, &bb] {
        assert_eq!(strategy.can_lock(&b("B1"), info), LockOutcome::Success);
        strategy.lock(&b("B1"), info);
    }
    assert!(strategy.can_lock(&b("B1"), &c).is_rejected());

    strategy.unlock(&b("B1"), &a);
    assert_eq!(strategy.can_lock(&b("B1"), &c), LockOutcome::Success);
}

#[test]
fn same_group_in_other_boundary_is_independent() {
    let strategy = ConcurrencyLimitedStrategy::new();
    let info = ConcurrencyLimitedInfo::new("A", ConcurrencyLimit::Limited(1)).with_group("g");
    strategy.lock(&b("B1"), &info);

    assert_eq!(strategy.can_lock(&b("B2"), &info), LockOutcome::Success);
}

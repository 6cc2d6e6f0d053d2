//! Unlock followed by can_lock succeeds again

use crate::prelude::*;
use yare::parameterized;

#[parameterized(
    boundary = { ExecutionMode::Boundary },
    action = { ExecutionMode::Action },
)]
fn single_execution_readmits(mode: ExecutionMode) {
    let strategy = SingleExecutionStrategy::new();
    let info = SingleExecutionInfo::new("save", mode);
    strategy.lock(&b("B1"), &info);
    assert!(strategy.can_lock(&b("B1"), &SingleExecutionInfo::new("save", mode)).is_rejected());

    strategy.unlock(&b("B1"), &info);

    assert_eq!(strategy.can_lock(&b("B1"), &SingleExecutionInfo::new("save", mode)), LockOutcome::Success);
}

#[test]
fn priority_readmits() {
    let strategy = PriorityBasedStrategy::new();
    let info = PriorityInfo::new("a", Priority::High(ConcurrencyBehavior::Exclusive));
    strategy.lock(&b("B1"), &info);

    strategy.unlock(&b("B1"), &info);

    assert_eq!(
        strategy.can_lock(&b("B1"), &PriorityInfo::new("b", Priority::Low(ConcurrencyBehavior::Exclusive))),
        LockOutcome::Success
    );
}

#[test]
fn group_leader_readmits() {
    let strategy = GroupCoordinationStrategy::new();
    let role = GroupRole::Leader(LeaderEntryPolicy::WithoutLeader);
    let info = GroupCoordinatedInfo::new("main", "tabs", role);
    strategy.lock(&b("B1"), &info);

    strategy.unlock(&b("B1"), &info);

    assert_eq!(
        strategy.can_lock(&b("B1"), &GroupCoordinatedInfo::new("side", "tabs", role)),
        LockOutcome::Success
    );
}

#[test]
fn composite_readmits() {
    let strategy = CompositeStrategy2::new(SingleExecutionStrategy::new(), ConcurrencyLimitedStrategy::new());
    let info = || {
        CompositeInfo2::new(
            "job",
            SingleExecutionInfo::new("job", ExecutionMode::Action),
            ConcurrencyLimitedInfo::new("job", ConcurrencyLimit::Limited(1)),
        )
    };
    let first = info();
    strategy.lock(&b("B1"), &first);
    assert!(strategy.can_lock(&b("B1"), &info()).is_rejected());

    strategy.unlock(&b("B1"), &first);

    assert_eq!(strategy.can_lock(&b("B1"), &info()), LockOutcome::Success);
}

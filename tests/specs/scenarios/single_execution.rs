//! Single-execution specs

use crate::prelude::*;

#[test]
fn boundary_mode_blocks_until_unlocked() {
    let strategy = SingleExecutionStrategy::new();
    let login = SingleExecutionInfo::new("login", ExecutionMode::Boundary);
    let other = SingleExecutionInfo::new("other", ExecutionMode::Boundary);

    assert_eq!(strategy.can_lock(&b("B1"), &login), LockOutcome::Success);
    strategy.lock(&b("B1"), &login);

    assert!(matches!(
        strategy.can_lock(&b("B1"), &other),
        LockOutcome::Rejected(LockConflict::AlreadyLocked { ref existing, .. })
        if existing == &ActionId::new("login")
    ));

    strategy.unlock(&b("B1"), &login);
    assert_eq!(strategy.can_lock(&b("B1"), &other), LockOutcome::Success);
}

#[test]
fn action_mode_blocks_only_the_same_action() {
    let strategy = SingleExecutionStrategy::new();
    strategy.lock(&b("B1"), &SingleExecutionInfo::new("save", ExecutionMode::Action));

    assert!(strategy
        .can_lock(&b("B1"), &SingleExecutionInfo::new("save", ExecutionMode::Action))
        .is_rejected());
    assert_eq!(
        strategy.can_lock(&b("B1"), &SingleExecutionInfo::new("load", ExecutionMode::Action)),
        LockOutcome::Success
    );
}

#[test]
fn unlock_releases_every_entry_of_the_action() {
    let strategy = SingleExecutionStrategy::new();
    strategy.lock(&b("B1"), &SingleExecutionInfo::new("poll", ExecutionMode::None));
    strategy.lock(&b("B1"), &SingleExecutionInfo::new("poll", ExecutionMode::None));

    strategy.unlock(&b("B1"), &SingleExecutionInfo::new("poll", ExecutionMode::None));

    assert!(strategy.current_locks().is_empty());
}

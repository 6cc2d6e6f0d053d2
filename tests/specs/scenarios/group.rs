//! Group-coordination specs

use crate::prelude::*;

#[test]
fn member_joins_after_leader() {
    let strategy = GroupCoordinationStrategy::new();
    let member = GroupCoordinatedInfo::new("refresh", "G1", GroupRole::Member);

    assert_eq!(
        strategy.can_lock(&b("B1"), &member).conflict().map(LockConflict::name),
        Some("member_cannot_join_empty_group")
    );

    strategy.lock(
        &b("B1"),
        &GroupCoordinatedInfo::new("navigate", "G1", GroupRole::Leader(LeaderEntryPolicy::WithoutMembers)),
    );
    assert_eq!(strategy.can_lock(&b("B1"), &member), LockOutcome::Success);
}

#[test]
fn multi_group_member_needs_every_group_occupied() {
    let strategy = GroupCoordinationStrategy::new();
    let leader = GroupRole::Leader(LeaderEntryPolicy::EmptyGroup);
    strategy.lock(&b("B1"), &GroupCoordinatedInfo::new("lead-1", "G1", leader));

    let member =
        GroupCoordinatedInfo::with_groups("follow", ["G1", "G2"], GroupRole::Member).unwrap();
    assert!(strategy.can_lock(&b("B1"), &member).is_rejected());

    strategy.lock(&b("B1"), &GroupCoordinatedInfo::new("lead-2", "G2", leader));
    assert_eq!(strategy.can_lock(&b("B1"), &member), LockOutcome::Success);
}

#[test]
fn unlock_prunes_empty_groups() {
    let strategy = GroupCoordinationStrategy::new();
    let info = GroupCoordinatedInfo::with_groups(
        "lead",
        ["G1", "G2"],
        GroupRole::Leader(LeaderEntryPolicy::EmptyGroup),
    )
    .unwrap();
    strategy.lock(&b("B1"), &info);

    strategy.unlock(&b("B1"), &info);

    assert!(strategy.active_groups(&b("B1")).is_empty());
}

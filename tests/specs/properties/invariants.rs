//! Ledger invariants under random workloads

use crate::prelude::*;
use proptest::prelude::*;
use std::collections::HashMap;

#[derive(Clone, Debug)]
enum Op {
    Acquire(usize),
    Release(usize),
}

fn ops() -> impl Strategy<Value = Vec<Op>> {
    proptest::collection::vec(
        prop_oneof![
            (0usize..4).prop_map(Op::Acquire),
            (0usize..8).prop_map(Op::Release),
        ],
        0..80,
    )
}

const ACTIONS: [&str; 4] = ["save", "load", "sync", "export"];

proptest! {
    #[test]
    fn action_mode_holds_one_entry_per_action(ops in ops()) {
        let strategy = SingleExecutionStrategy::new();
        let mut held: Vec<SingleExecutionInfo> = Vec::new();

        for op in ops {
            match op {
                Op::Acquire(i) => {
                    let info = SingleExecutionInfo::new(ACTIONS[i], ExecutionMode::Action);
                    if strategy.can_lock(&b("B1"), &info).is_admitted() {
                        strategy.lock(&b("B1"), &info);
                        held.push(info);
                    }
                }
                Op::Release(i) if !held.is_empty() => {
                    let info = held.remove(i % held.len());
                    strategy.unlock(&b("B1"), &info);
                }
                Op::Release(_) => {}
            }

            let mut per_action: HashMap<ActionId, usize> = HashMap::new();
            for entry in strategy.current_locks().into_values().flatten() {
                *per_action.entry(entry.action_id).or_default() += 1;
            }
            prop_assert!(per_action.values().all(|count| *count <= 1));
        }
    }

    #[test]
    fn boundary_mode_holds_one_entry_per_boundary(ops in ops()) {
        let strategy = SingleExecutionStrategy::new();
        let mut held: Vec<SingleExecutionInfo> = Vec::new();

        for op in ops {
            match op {
                Op::Acquire(i) => {
                    let info = SingleExecutionInfo::new(ACTIONS[i], ExecutionMode::Boundary);
                    if strategy.can_lock(&b("B1"), &info).is_admitted() {
                        strategy.lock(&b("B1"), &info);
                        held.push(info);
                    }
                }
                Op::Release(i) if !held.is_empty() => {
                    let info = held.remove(i % held.len());
                    strategy.unlock(&b("B1"), &info);
                }
                Op::Release(_) => {}
            }
            prop_assert!(entry_count(&strategy.lock_snapshot()) <= 1);
        }
    }

    #[test]
    fn same_level_follows_existing_behavior(
        high in any::<bool>(),
        existing_exclusive in any::<bool>(),
        requested_exclusive in any::<bool>(),
    ) {
        let behavior = |exclusive: bool| if exclusive {
            ConcurrencyBehavior::Exclusive
        } else {
            ConcurrencyBehavior::Replaceable
        };
        let level = |b: ConcurrencyBehavior| if high { Priority::High(b) } else { Priority::Low(b) };

        let strategy = PriorityBasedStrategy::new();
        let existing = PriorityInfo::new("x", level(behavior(existing_exclusive)));
        strategy.lock(&b("B1"), &existing);

        let outcome = strategy.can_lock(&b("B1"), &PriorityInfo::new("y", level(behavior(requested_exclusive))));

        if existing_exclusive {
            prop_assert_eq!(outcome.conflict().map(LockConflict::name), Some("same_priority_conflict"));
        } else {
            prop_assert_eq!(outcome, LockOutcome::preceding(&b("B1"), &existing));
        }
    }

    #[test]
    fn limit_admits_exactly_below_count(limit in 0usize..5, active in 0usize..6) {
        let strategy = ConcurrencyLimitedStrategy::new();
        let info = |i: usize| {
            ConcurrencyLimitedInfo::new(format!("a{i}"), ConcurrencyLimit::Limited(limit)).with_group("g")
        };
        for i in 0..active {
            strategy.lock(&b("B1"), &info(i));
        }

        let admitted = strategy.can_lock(&b("B1"), &info(99)).is_admitted();

        prop_assert_eq!(admitted, active < limit);
    }

    #[test]
    fn empty_group_leader_waits_for_empty_groups(
        occupied in proptest::collection::vec(any::<bool>(), 1..=MAX_GROUPS),
    ) {
        let strategy = GroupCoordinationStrategy::new();
        let groups: Vec<String> = (0..occupied.len()).map(|i| format!("G{i}")).collect();
        for (group, busy) in groups.iter().zip(&occupied) {
            if *busy {
                strategy.lock(&b("B1"), &GroupCoordinatedInfo::new("other", group.as_str(), GroupRole::None));
            }
        }

        let leader = GroupCoordinatedInfo::with_groups(
            "lead",
            groups.iter().map(String::as_str),
            GroupRole::Leader(LeaderEntryPolicy::EmptyGroup),
        ).unwrap();
        let member = GroupCoordinatedInfo::with_groups("follow", groups.iter().map(String::as_str), GroupRole::Member).unwrap();

        prop_assert_eq!(strategy.can_lock(&b("B1"), &leader).is_admitted(), occupied.iter().all(|busy| !busy));
        prop_assert_eq!(strategy.can_lock(&b("B1"), &member).is_admitted(), occupied.iter().all(|busy| *busy));
    }

    #[test]
    fn composite_rejection_at_any_position_locks_nothing(blocking in 0usize..3) {
        let strategy = CompositeStrategy3::new(
            ConcurrencyLimitedStrategy::new(),
            ConcurrencyLimitedStrategy::with_id(StrategyId::new("concurrency_limited").with_configuration("2")),
            ConcurrencyLimitedStrategy::with_id(StrategyId::new("concurrency_limited").with_configuration("3")),
        );
        let limit = |i: usize| ConcurrencyLimit::Limited(if i == blocking { 0 } else { 1 });
        let info = CompositeInfo3::new(
            "job",
            ConcurrencyLimitedInfo::new("job", limit(0)),
            ConcurrencyLimitedInfo::new("job", limit(1)),
            ConcurrencyLimitedInfo::new("job", limit(2)),
        );

        let outcome = strategy.can_lock(&b("B1"), &info);

        prop_assert!(outcome.is_rejected());
        prop_assert!(strategy.lock_snapshot().is_empty());
    }
}

#[test]
fn clean_up_empties_every_strategy() {
    let registry = StrategyRegistry::with_builtins();
    let id = |name: &str| StrategyId::new(name);
    let single = registry.resolve::<SingleExecutionInfo>(&id("single_execution")).unwrap();
    let priority = registry.resolve::<PriorityInfo>(&id("priority_based")).unwrap();
    let limited = registry.resolve::<ConcurrencyLimitedInfo>(&id("concurrency_limited")).unwrap();
    let groups = registry.resolve::<GroupCoordinatedInfo>(&id("group_coordination")).unwrap();

    for boundary in ["B1", "B2", "B3"] {
        single.lock(&b(boundary), &SingleExecutionInfo::new("save", ExecutionMode::Action));
        priority.lock(&b(boundary), &PriorityInfo::new("sync", Priority::Low(ConcurrencyBehavior::Replaceable)));
        limited.lock(&b(boundary), &ConcurrencyLimitedInfo::new("upload", ConcurrencyLimit::Unlimited));
        groups.lock(&b(boundary), &GroupCoordinatedInfo::new("tab", "tabs", GroupRole::None));
    }
    assert_eq!(entry_count(&registry.lock_snapshot()), 12);

    registry.clean_up_all();

    assert!(registry.lock_snapshot().is_empty());
    for boundary in ["B1", "B2", "B3"] {
        assert!(single.lock_snapshot().get(&b(boundary)).is_none());
        assert!(groups.lock_snapshot().get(&b(boundary)).is_none());
    }
}

//! Execution-layer specs: preemption cancels before the newcomer starts

use crate::prelude::*;
use lockgate_runtime::ActionRunner;
use std::sync::Arc;

#[tokio::test]
async fn preempted_entry_is_unlocked_before_newcomer_locks() {
    let runner = ActionRunner::new();
    let strategy = Arc::new(PriorityBasedStrategy::new());

    let low = runner
        .run(
            Arc::clone(&strategy),
            "B1",
            PriorityInfo::new("sync", Priority::Low(ConcurrencyBehavior::Exclusive)),
            std::future::pending::<()>(),
        )
        .unwrap();
    let high = runner
        .run(
            Arc::clone(&strategy),
            "B1",
            PriorityInfo::new("save", Priority::High(ConcurrencyBehavior::Exclusive)),
            std::future::pending::<()>(),
        )
        .unwrap();

    let active: Vec<ActionId> = strategy.current_locks()[&b("B1")]
        .iter()
        .map(|e| e.action_id.clone())
        .collect();
    assert_eq!(active, vec![ActionId::new("save")]);
    assert!(low.join().await.unwrap_err().is_cancelled());

    runner.shutdown();
    assert!(high.join().await.unwrap_err().is_cancelled());
    assert!(strategy.current_locks().is_empty());
}

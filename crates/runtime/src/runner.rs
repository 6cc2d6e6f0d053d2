// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Action runner
//!
//! Admits an action through a strategy, cancels the entries it preempts,
//! runs it on tokio and releases its lock when it finishes. A finished,
//! panicked or aborted action always releases its entry.

use crate::error::RunError;
use crate::gate::{self, BoundaryGate};
use crate::unlock::{UnlockOption, UnlockToken};
use lockgate_core::{
    ActionId, BoundaryId, CancellationTarget, LockConflict, LockInfo, LockStrategy, RuntimeConfig,
    UniqueId,
};
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};
use tokio::task::{AbortHandle, JoinHandle};
use tracing::Instrument;

/// Called when an action is rejected
pub type FailureHandler = Arc<dyn Fn(&BoundaryId, &ActionId, &LockConflict) + Send + Sync>;

struct RunningEntry {
    action_id: ActionId,
    boundary: BoundaryId,
    /// Own unique id first, then any sub-info ids
    ids: Vec<UniqueId>,
    cancellable: bool,
    abort: AbortHandle,
    release: Box<dyn Fn() -> bool + Send + Sync>,
}

type RunningMap = Arc<Mutex<HashMap<UniqueId, Arc<RunningEntry>>>>;

fn forget(running: &Mutex<HashMap<UniqueId, Arc<RunningEntry>>>, ids: &[UniqueId]) {
    let mut running = running.lock().unwrap_or_else(|e| e.into_inner());
    for id in ids {
        running.remove(id);
    }
}

/// Releases the entry when the task ends, however it ends
struct Completion<S: LockStrategy + ?Sized> {
    token: Arc<UnlockToken<S>>,
    ids: Vec<UniqueId>,
    running: RunningMap,
    finished: bool,
}

impl<S: LockStrategy + ?Sized + 'static> Completion<S> {
    /// Deferred unlocks run on their own task, after the output is ready
    fn finish(mut self) {
        self.finished = true;
        forget(&self.running, &self.ids);
        match self.token.option() {
            UnlockOption::Immediate => {
                self.token.release_now();
            }
            UnlockOption::NextCycle | UnlockOption::Delayed(_) => {
                let token = Arc::clone(&self.token);
                tokio::spawn(async move {
                    token.release().await;
                });
            }
        }
    }
}

impl<S: LockStrategy + ?Sized> Drop for Completion<S> {
    fn drop(&mut self) {
        forget(&self.running, &self.ids);
        if !self.finished {
            self.token.release_now();
        }
    }
}

/// A spawned action
#[derive(Debug)]
pub struct RunHandle<T> {
    unique_id: UniqueId,
    handle: JoinHandle<T>,
}

impl<T> RunHandle<T> {
    pub fn unique_id(&self) -> &UniqueId {
        &self.unique_id
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the action's output
    pub async fn join(self) -> Result<T, RunError> {
        match self.handle.await {
            Ok(output) => Ok(output),
            Err(e) if e.is_cancelled() => Err(RunError::Cancelled {
                unique_id: self.unique_id,
            }),
            Err(source) => Err(RunError::Join {
                unique_id: self.unique_id,
                source,
            }),
        }
    }
}

/// Runs actions under lock strategies
///
/// Clones share the gate and the set of running actions.
#[derive(Clone)]
pub struct ActionRunner {
    gate: Arc<BoundaryGate>,
    unlock: UnlockOption,
    running: RunningMap,
    on_failure: Option<FailureHandler>,
}

impl ActionRunner {
    pub fn new() -> Self {
        Self {
            gate: Arc::new(BoundaryGate::new()),
            unlock: UnlockOption::Immediate,
            running: Arc::new(Mutex::new(HashMap::new())),
            on_failure: None,
        }
    }

    pub fn from_config(config: &RuntimeConfig) -> Self {
        Self::new().with_unlock(config.unlock)
    }

    pub fn with_unlock(mut self, unlock: UnlockOption) -> Self {
        self.unlock = unlock;
        self
    }

    /// Share a gate with other runners or direct `acquire` callers
    pub fn with_gate(mut self, gate: Arc<BoundaryGate>) -> Self {
        self.gate = gate;
        self
    }

    pub fn with_failure_handler(
        mut self,
        handler: impl Fn(&BoundaryId, &ActionId, &LockConflict) + Send + Sync + 'static,
    ) -> Self {
        self.on_failure = Some(Arc::new(handler));
        self
    }

    pub fn gate(&self) -> &Arc<BoundaryGate> {
        &self.gate
    }

    /// Admit and spawn an action
    ///
    /// Preempted actions are aborted and unlocked before the new entry is
    /// locked. A rejection invokes the failure handler once the boundary is
    /// free again. Must be called within a tokio runtime.
    pub fn run<S, F>(
        &self,
        strategy: Arc<S>,
        boundary: impl Into<BoundaryId>,
        info: S::Info,
        operation: F,
    ) -> Result<RunHandle<F::Output>, RunError>
    where
        S: LockStrategy + ?Sized + 'static,
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        let boundary = boundary.into();
        let span = tracing::info_span!(
            "action.run",
            strategy = %strategy.strategy_id(),
            %boundary,
            action_id = %info.action_id()
        );
        let _guard = span.enter();
        let action_id = info.action_id().clone();

        // The handler runs after the boundary is released so it may run again
        let admitted: Result<RunHandle<F::Output>, LockConflict> =
            self.gate.with_boundary(&boundary, || {
                let admission = gate::check(&*strategy, &boundary, &info)?;
                for target in &admission.cancellations {
                    self.cancel_target(target);
                }
                strategy.lock(&boundary, &info);
                Ok(self.spawn(strategy, boundary.clone(), info, operation, span.clone()))
            });

        admitted.map_err(|conflict| {
            tracing::info!(reason = conflict.name(), error = %conflict, "rejected");
            if let Some(handler) = &self.on_failure {
                handler(&boundary, &action_id, &conflict);
            }
            RunError::Rejected(conflict)
        })
    }

    /// Run an action and wait for its output
    pub async fn run_to_completion<S, F>(
        &self,
        strategy: Arc<S>,
        boundary: impl Into<BoundaryId>,
        info: S::Info,
        operation: F,
    ) -> Result<F::Output, RunError>
    where
        S: LockStrategy + ?Sized + 'static,
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        self.run(strategy, boundary, info, operation)?.join().await
    }

    fn spawn<S, F>(
        &self,
        strategy: Arc<S>,
        boundary: BoundaryId,
        info: S::Info,
        operation: F,
        span: tracing::Span,
    ) -> RunHandle<F::Output>
    where
        S: LockStrategy + ?Sized + 'static,
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        let unique_id = info.unique_id().clone();
        let action_id = info.action_id().clone();
        let cancellable = info.is_cancellation_target();
        let ids = info.unique_ids();
        let token = Arc::new(UnlockToken::new(strategy, boundary.clone(), info, self.unlock));
        let completion = Completion {
            token: Arc::clone(&token),
            ids: ids.clone(),
            running: Arc::clone(&self.running),
            finished: false,
        };

        // Held across spawn so a fast task cannot finish before it is tracked
        let mut running = self.running.lock().unwrap_or_else(|e| e.into_inner());
        let handle = tokio::spawn(
            async move {
                let output = operation.await;
                completion.finish();
                output
            }
            .instrument(span),
        );

        let entry = Arc::new(RunningEntry {
            action_id,
            boundary,
            ids: ids.clone(),
            cancellable,
            abort: handle.abort_handle(),
            release: Box::new(move || token.release_now()),
        });
        for id in ids {
            running.insert(id, Arc::clone(&entry));
        }
        drop(running);

        tracing::debug!(%unique_id, cancellable, "action started");
        RunHandle { unique_id, handle }
    }

    fn cancel_target(&self, target: &CancellationTarget) {
        let entry = self
            .running
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(&target.unique_id)
            .cloned();

        match entry {
            Some(entry) if entry.cancellable => self.stop(&entry),
            Some(_) => tracing::debug!(
                unique_id = %target.unique_id,
                "cancellation target is not cancellable"
            ),
            None => tracing::warn!(
                boundary = %target.boundary_id,
                action_id = %target.action_id,
                unique_id = %target.unique_id,
                "cancellation target is not running"
            ),
        }
    }

    fn stop(&self, entry: &RunningEntry) {
        forget(&self.running, &entry.ids);
        entry.abort.abort();
        (entry.release)();
        tracing::info!(
            boundary = %entry.boundary,
            action_id = %entry.action_id,
            unique_id = %entry.ids[0],
            "action cancelled"
        );
    }

    /// Abort a running action and release its entry
    ///
    /// Returns false if no running action answers to `unique_id`.
    pub fn cancel(&self, unique_id: &UniqueId) -> bool {
        let entry = self
            .running
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(unique_id)
            .cloned();

        match entry {
            Some(entry) => {
                self.stop(&entry);
                true
            }
            None => false,
        }
    }

    pub fn is_running(&self, unique_id: &UniqueId) -> bool {
        self.running
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains_key(unique_id)
    }

    /// Unique ids of in-flight actions, sorted
    pub fn running(&self) -> Vec<UniqueId> {
        let running = self.running.lock().unwrap_or_else(|e| e.into_inner());
        let mut ids: Vec<UniqueId> = running
            .iter()
            .filter(|(id, entry)| entry.ids.first() == Some(*id))
            .map(|(id, _)| id.clone())
            .collect();
        ids.sort();
        ids
    }

    /// Abort every running action and release its entry
    pub fn shutdown(&self) {
        let entries: Vec<Arc<RunningEntry>> = {
            let mut running = self.running.lock().unwrap_or_else(|e| e.into_inner());
            running
                .drain()
                .filter(|(id, entry)| entry.ids.first() == Some(id))
                .map(|(_, entry)| entry)
                .collect()
        };

        for entry in &entries {
            entry.abort.abort();
            (entry.release)();
        }
        tracing::info!(aborted = entries.len(), "runner shut down");
    }
}

impl Default for ActionRunner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "runner_tests.rs"]
mod tests;

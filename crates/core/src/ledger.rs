// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Active-lock ledger shared by every strategy
//!
//! Entries are bucketed by boundary and kept in insertion order. Each
//! strategy supplies a key extractor (an entry may carry several keys, as
//! group coordination does); the bucket counts active entries per key so
//! lookups by key stay cheap and empty keys are pruned. Removing the last
//! entry of a boundary drops the whole bucket.

use crate::id::{ActionId, BoundaryId, UniqueId};
use crate::info::LockInfo;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Mutex, MutexGuard};

/// Extracts the strategy-chosen keys of an entry
pub type KeyFn<I, K> = fn(&I) -> Vec<K>;

#[derive(Debug)]
struct Bucket<I, K> {
    /// Insertion order is load-bearing for priority tie-breaks
    entries: Vec<I>,
    key_counts: HashMap<K, usize>,
}

impl<I, K> Default for Bucket<I, K> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            key_counts: HashMap::new(),
        }
    }
}

/// Thread-safe map of boundary to ordered active entries
#[derive(Debug)]
pub struct LockLedger<I, K = ActionId> {
    buckets: Mutex<HashMap<BoundaryId, Bucket<I, K>>>,
    keys_of: KeyFn<I, K>,
}

impl<I: LockInfo> LockLedger<I, ActionId> {
    /// Ledger keyed by each entry's action id
    pub fn by_action() -> Self {
        Self::new(|info: &I| vec![info.action_id().clone()])
    }
}

impl<I, K> LockLedger<I, K>
where
    I: LockInfo,
    K: Clone + Eq + Hash,
{
    pub fn new(keys_of: KeyFn<I, K>) -> Self {
        Self {
            buckets: Mutex::new(HashMap::new()),
            keys_of,
        }
    }

    fn buckets(&self) -> MutexGuard<'_, HashMap<BoundaryId, Bucket<I, K>>> {
        self.buckets.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Append an entry to the boundary's bucket
    ///
    /// Returns `false` (and leaves the ledger untouched) if an entry with the
    /// same unique id is already present.
    pub fn add(&self, boundary: &BoundaryId, entry: I) -> bool {
        let mut buckets = self.buckets();
        let bucket = buckets.entry(boundary.clone()).or_default();

        if bucket
            .entries
            .iter()
            .any(|e| e.unique_id() == entry.unique_id())
        {
            tracing::warn!(
                %boundary,
                action_id = %entry.action_id(),
                unique_id = %entry.unique_id(),
                "ignoring duplicate lock entry"
            );
            return false;
        }

        for key in (self.keys_of)(&entry) {
            *bucket.key_counts.entry(key).or_insert(0) += 1;
        }
        tracing::trace!(
            %boundary,
            action_id = %entry.action_id(),
            unique_id = %entry.unique_id(),
            "lock entry added"
        );
        bucket.entries.push(entry);
        true
    }

    /// Remove every entry matching `matches`, returning them in insertion order
    pub fn remove_where(&self, boundary: &BoundaryId, matches: impl Fn(&I) -> bool) -> Vec<I> {
        let mut buckets = self.buckets();
        let Some(bucket) = buckets.get_mut(boundary) else {
            return Vec::new();
        };

        let (removed, kept): (Vec<I>, Vec<I>) =
            std::mem::take(&mut bucket.entries).into_iter().partition(|e| matches(e));
        bucket.entries = kept;

        for entry in &removed {
            for key in (self.keys_of)(entry) {
                if let Some(count) = bucket.key_counts.get_mut(&key) {
                    *count = count.saturating_sub(1);
                    if *count == 0 {
                        bucket.key_counts.remove(&key);
                    }
                }
            }
            tracing::trace!(
                %boundary,
                action_id = %entry.action_id(),
                unique_id = %entry.unique_id(),
                "lock entry removed"
            );
        }

        if bucket.entries.is_empty() {
            buckets.remove(boundary);
        }

        removed
    }

    /// Remove the entry with exactly this unique id
    pub fn remove_unique(&self, boundary: &BoundaryId, unique_id: &UniqueId) -> Option<I> {
        self.remove_where(boundary, |e| e.unique_id() == unique_id)
            .into_iter()
            .next()
    }

    /// Remove every entry carrying `key`
    pub fn remove_by_key(&self, boundary: &BoundaryId, key: &K) -> Vec<I> {
        let keys_of = self.keys_of;
        self.remove_where(boundary, |e| keys_of(e).contains(key))
    }

    /// Run `f` over the boundary's entries inside the critical section
    pub fn inspect<R>(&self, boundary: &BoundaryId, f: impl FnOnce(&[I]) -> R) -> R {
        let buckets = self.buckets();
        match buckets.get(boundary) {
            Some(bucket) => f(&bucket.entries),
            None => f(&[]),
        }
    }

    /// Snapshot of the boundary's entries in insertion order
    pub fn current_entries(&self, boundary: &BoundaryId) -> Vec<I> {
        self.inspect(boundary, <[I]>::to_vec)
    }

    /// Entries carrying `key`, in insertion order
    pub fn entries_for_key(&self, boundary: &BoundaryId, key: &K) -> Vec<I> {
        let keys_of = self.keys_of;
        self.inspect(boundary, |entries| {
            entries
                .iter()
                .filter(|e| keys_of(e).contains(key))
                .cloned()
                .collect()
        })
    }

    /// Number of active entries carrying `key`
    pub fn count_for_key(&self, boundary: &BoundaryId, key: &K) -> usize {
        self.buckets()
            .get(boundary)
            .and_then(|b| b.key_counts.get(key).copied())
            .unwrap_or(0)
    }

    /// Keys with at least one active entry in the boundary
    pub fn keys(&self, boundary: &BoundaryId) -> Vec<K> {
        self.buckets()
            .get(boundary)
            .map(|b| b.key_counts.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Snapshot of every non-empty boundary
    pub fn all_entries(&self) -> HashMap<BoundaryId, Vec<I>> {
        self.buckets()
            .iter()
            .map(|(boundary, bucket)| (boundary.clone(), bucket.entries.clone()))
            .collect()
    }

    pub fn boundaries(&self) -> Vec<BoundaryId> {
        self.buckets().keys().cloned().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets().is_empty()
    }

    pub fn remove_all(&self) {
        self.buckets().clear();
    }

    pub fn remove_all_in(&self, boundary: &BoundaryId) {
        self.buckets().remove(boundary);
    }
}

#[cfg(test)]
#[path = "ledger_tests.rs"]
mod tests;

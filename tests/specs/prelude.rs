//! Shared helpers for lockgate specs

pub use lockgate_core::*;

pub fn b(name: &str) -> BoundaryId {
    BoundaryId::new(name)
}

/// Entries of every boundary, flattened
pub fn entry_count(snapshot: &std::collections::HashMap<BoundaryId, Vec<LockSummary>>) -> usize {
    snapshot.values().map(Vec::len).sum()
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the action runner

use lockgate_core::{LockConflict, UniqueId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RunError {
    #[error("rejected: {0}")]
    Rejected(#[from] LockConflict),
    #[error("action {unique_id} was cancelled")]
    Cancelled { unique_id: UniqueId },
    #[error("action {unique_id} failed: {source}")]
    Join {
        unique_id: UniqueId,
        #[source]
        source: tokio::task::JoinError,
    },
}

impl RunError {
    pub fn conflict(&self) -> Option<&LockConflict> {
        match self {
            RunError::Rejected(conflict) => Some(conflict),
            _ => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, RunError::Cancelled { .. })
    }
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! lockgate-runtime: executes admitted actions on tokio
//!
//! Serializes check-then-act per boundary, cancels preempted actions and
//! releases locks with the configured timing.

mod error;
mod gate;
mod runner;
mod unlock;

pub use error::RunError;
pub use gate::{Admission, BoundaryGate};
pub use runner::{ActionRunner, FailureHandler, RunHandle};
pub use unlock::{UnlockOption, UnlockToken};

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! lockgate-core: admission control for in-process actions
//!
//! This crate provides:
//! - A thread-safe ledger of active entries per boundary
//! - Five lock strategies: single-execution, priority-based,
//!   concurrency-limited, group-coordination and composite
//! - A caller-owned strategy registry with TOML configuration

pub mod id;

pub mod conflict;
pub mod info;
pub mod ledger;
pub mod strategy;

pub mod config;
pub mod registry;

// Re-exports
pub use config::{
    load_config, parse_config, ConfigError, LockgateConfig, RuntimeConfig, StrategyConfig,
    StrategyKind, UnlockOption,
};
pub use conflict::LockConflict;
pub use id::{ActionId, BoundaryId, GroupId, UniqueId};
pub use info::{CancellationTarget, LockInfo, LockOutcome, LockSummary};
pub use ledger::LockLedger;
pub use registry::{RegistryError, StrategyRegistry};
pub use strategy::{AnyLockStrategy, LockStrategy, StrategyId};

// Re-export strategies
pub use strategy::composite::{
    CompositeInfo2, CompositeInfo3, CompositeInfo4, CompositeInfo5, CompositeStrategy2,
    CompositeStrategy3, CompositeStrategy4, CompositeStrategy5,
};
pub use strategy::concurrency::{ConcurrencyLimit, ConcurrencyLimitedInfo, ConcurrencyLimitedStrategy};
pub use strategy::group::{
    GroupCoordinatedInfo, GroupCoordinationStrategy, GroupInfoError, GroupRole, LeaderEntryPolicy,
    MAX_GROUPS,
};
pub use strategy::priority::{ConcurrencyBehavior, Priority, PriorityBasedStrategy, PriorityInfo};
pub use strategy::single_execution::{ExecutionMode, SingleExecutionInfo, SingleExecutionStrategy};

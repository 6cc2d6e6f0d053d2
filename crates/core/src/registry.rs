// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Strategy registry
//!
//! Maps a [`StrategyId`] to one strategy instance. The registry is owned by
//! the caller and is usually built once at startup, then shared.

use crate::config::{ConfigError, LockgateConfig, StrategyKind};
use crate::id::BoundaryId;
use crate::info::{LockInfo, LockSummary};
use crate::strategy::concurrency::ConcurrencyLimitedStrategy;
use crate::strategy::group::GroupCoordinationStrategy;
use crate::strategy::priority::PriorityBasedStrategy;
use crate::strategy::single_execution::SingleExecutionStrategy;
use crate::strategy::{AnyLockStrategy, LockStrategy, StrategyId};
use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("strategy '{id}' is not registered")]
    StrategyNotRegistered { id: StrategyId },

    #[error("strategy '{id}' is already registered")]
    StrategyAlreadyRegistered { id: StrategyId },

    #[error("strategy '{id}' handles {actual}, not {expected}")]
    StrategyTypeMismatch {
        id: StrategyId,
        expected: &'static str,
        actual: &'static str,
    },
}

struct Registered {
    erased: Arc<dyn AnyLockStrategy>,
    /// `Arc<dyn LockStrategy<Info = I>>` for the strategy's info type
    typed: Box<dyn Any + Send + Sync>,
}

/// Strategy instances by id, in registration order
#[derive(Default)]
pub struct StrategyRegistry {
    strategies: HashMap<StrategyId, Registered>,
    order: Vec<StrategyId>,
}

impl StrategyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding one default instance of each built-in strategy
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.insert(
            StrategyId::new(SingleExecutionStrategy::NAME),
            Arc::new(SingleExecutionStrategy::new()),
        );
        registry.insert(
            StrategyId::new(PriorityBasedStrategy::NAME),
            Arc::new(PriorityBasedStrategy::new()),
        );
        registry.insert(
            StrategyId::new(ConcurrencyLimitedStrategy::NAME),
            Arc::new(ConcurrencyLimitedStrategy::new()),
        );
        registry.insert(
            StrategyId::new(GroupCoordinationStrategy::NAME),
            Arc::new(GroupCoordinationStrategy::new()),
        );
        registry
    }

    /// Registry with one fresh instance per configured entry
    pub fn from_config(config: &LockgateConfig) -> Result<Self, ConfigError> {
        let mut registry = Self::new();
        for entry in &config.strategies {
            let id = entry.strategy_id();
            if registry.is_registered(&id) {
                tracing::warn!(strategy = %id, "duplicate strategy in config");
                return Err(ConfigError::DuplicateStrategy { id });
            }
            match entry.kind {
                StrategyKind::SingleExecution => {
                    registry.insert(id.clone(), Arc::new(SingleExecutionStrategy::with_id(id)))
                }
                StrategyKind::PriorityBased => {
                    registry.insert(id.clone(), Arc::new(PriorityBasedStrategy::with_id(id)))
                }
                StrategyKind::ConcurrencyLimited => {
                    registry.insert(id.clone(), Arc::new(ConcurrencyLimitedStrategy::with_id(id)))
                }
                StrategyKind::GroupCoordination => {
                    registry.insert(id.clone(), Arc::new(GroupCoordinationStrategy::with_id(id)))
                }
            }
        }
        Ok(registry)
    }

    /// Register under the strategy's own id, returning the shared instance
    pub fn register<S>(&mut self, strategy: S) -> Result<Arc<S>, RegistryError>
    where
        S: LockStrategy + 'static,
    {
        let strategy = Arc::new(strategy);
        self.register_as(strategy.strategy_id(), Arc::clone(&strategy))?;
        Ok(strategy)
    }

    /// Register an already shared instance under an explicit id
    pub fn register_as<S>(&mut self, id: StrategyId, strategy: Arc<S>) -> Result<(), RegistryError>
    where
        S: LockStrategy + 'static,
    {
        if self.is_registered(&id) {
            tracing::warn!(strategy = %id, "strategy already registered");
            return Err(RegistryError::StrategyAlreadyRegistered { id });
        }
        self.insert(id, strategy);
        Ok(())
    }

    fn insert<S>(&mut self, id: StrategyId, strategy: Arc<S>)
    where
        S: LockStrategy + 'static,
    {
        let typed: Arc<dyn LockStrategy<Info = S::Info>> = strategy.clone();
        tracing::debug!(
            strategy = %id,
            info_type = std::any::type_name::<S::Info>(),
            "strategy registered"
        );
        self.order.push(id.clone());
        self.strategies.insert(
            id,
            Registered {
                erased: strategy,
                typed: Box::new(typed),
            },
        );
    }

    /// Look up a strategy for the payload type `I`
    pub fn resolve<I: LockInfo>(
        &self,
        id: &StrategyId,
    ) -> Result<Arc<dyn LockStrategy<Info = I>>, RegistryError> {
        let Some(registered) = self.strategies.get(id) else {
            tracing::warn!(strategy = %id, "strategy not registered");
            return Err(RegistryError::StrategyNotRegistered { id: id.clone() });
        };

        match registered.typed.downcast_ref::<Arc<dyn LockStrategy<Info = I>>>() {
            Some(strategy) => Ok(Arc::clone(strategy)),
            None => {
                let actual = registered.erased.info_type_name();
                let expected = std::any::type_name::<I>();
                tracing::warn!(strategy = %id, expected, actual, "strategy type mismatch");
                Err(RegistryError::StrategyTypeMismatch {
                    id: id.clone(),
                    expected,
                    actual,
                })
            }
        }
    }

    /// Look up a strategy without naming its payload type
    pub fn get(&self, id: &StrategyId) -> Option<Arc<dyn AnyLockStrategy>> {
        self.strategies.get(id).map(|r| Arc::clone(&r.erased))
    }

    pub fn is_registered(&self, id: &StrategyId) -> bool {
        self.strategies.contains_key(id)
    }

    pub fn strategy_ids(&self) -> &[StrategyId] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    fn each(&self) -> impl Iterator<Item = &Arc<dyn AnyLockStrategy>> {
        self.order
            .iter()
            .filter_map(|id| self.strategies.get(id))
            .map(|r| &r.erased)
    }

    /// Drop every active entry of every registered strategy
    pub fn clean_up_all(&self) {
        for strategy in self.each() {
            strategy.reset();
        }
        tracing::debug!(strategies = self.len(), "cleaned up all strategies");
    }

    pub fn clean_up_boundary(&self, boundary: &BoundaryId) {
        for strategy in self.each() {
            strategy.reset_boundary(boundary);
        }
    }

    /// Active entries of all strategies per boundary, in registration order
    pub fn lock_snapshot(&self) -> HashMap<BoundaryId, Vec<LockSummary>> {
        let mut snapshot: HashMap<BoundaryId, Vec<LockSummary>> = HashMap::new();
        for strategy in self.each() {
            for (boundary, summaries) in strategy.snapshot() {
                snapshot.entry(boundary).or_default().extend(summaries);
            }
        }
        snapshot
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;

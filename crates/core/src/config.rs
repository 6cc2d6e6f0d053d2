// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! TOML configuration for strategy registries and unlock timing
//!
//! ```toml
//! [runtime]
//! unlock = { delayed = "100ms" }
//!
//! [[strategy]]
//! kind = "single_execution"
//! configuration = "forms"
//! ```

use crate::strategy::concurrency::ConcurrencyLimitedStrategy;
use crate::strategy::group::GroupCoordinationStrategy;
use crate::strategy::priority::PriorityBasedStrategy;
use crate::strategy::single_execution::SingleExecutionStrategy;
use crate::strategy::StrategyId;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Errors loading a configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("TOML syntax error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("IO error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("strategy '{id}' is configured more than once")]
    DuplicateStrategy { id: StrategyId },
}

/// When a finished action's entry is released
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnlockOption {
    /// As soon as the action completes
    #[default]
    Immediate,
    /// After yielding once to the scheduler
    NextCycle,
    /// After a fixed delay
    Delayed(#[serde(with = "humantime_serde")] Duration),
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    #[serde(default)]
    pub unlock: UnlockOption,
}

/// Built-in strategy kinds a config entry may name
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    SingleExecution,
    PriorityBased,
    ConcurrencyLimited,
    GroupCoordination,
}

impl StrategyKind {
    /// Id name used when an entry omits `name`
    pub fn default_name(&self) -> &'static str {
        match self {
            StrategyKind::SingleExecution => SingleExecutionStrategy::NAME,
            StrategyKind::PriorityBased => PriorityBasedStrategy::NAME,
            StrategyKind::ConcurrencyLimited => ConcurrencyLimitedStrategy::NAME,
            StrategyKind::GroupCoordination => GroupCoordinationStrategy::NAME,
        }
    }
}

/// One `[[strategy]]` entry
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyConfig {
    pub kind: StrategyKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub configuration: Option<String>,
}

impl StrategyConfig {
    pub fn new(kind: StrategyKind) -> Self {
        Self {
            kind,
            name: None,
            configuration: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_configuration(mut self, configuration: impl Into<String>) -> Self {
        self.configuration = Some(configuration.into());
        self
    }

    pub fn strategy_id(&self) -> StrategyId {
        let name = self
            .name
            .clone()
            .unwrap_or_else(|| self.kind.default_name().to_string());
        let id = StrategyId::new(name);
        match &self.configuration {
            Some(configuration) => id.with_configuration(configuration.clone()),
            None => id,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockgateConfig {
    #[serde(default)]
    pub runtime: RuntimeConfig,
    #[serde(default, rename = "strategy")]
    pub strategies: Vec<StrategyConfig>,
}

/// Parse a configuration from TOML content
pub fn parse_config(toml_content: &str) -> Result<LockgateConfig, ConfigError> {
    let config: LockgateConfig = toml::from_str(toml_content)?;
    Ok(config)
}

/// Parse a configuration from a TOML file
pub fn load_config(path: &Path) -> Result<LockgateConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    parse_config(&content)
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;

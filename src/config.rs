//! Configuration loading from TOML.
//!
//! Reads `config.toml` and deserializes into strongly-typed structs. Every
//! section falls back to its defaults, so a partial file (or none at all,
//! via `load_or_default`) is valid.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::warn;

use crate::discovery::DiscoveryConfig;
use crate::selection::SelectionConfig;
use crate::stats::StatisticsConfig;
use crate::strategy::ScoringConfig;
use crate::types::StrategySpec;

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub engine: EngineConfig,
    pub statistics: StatisticsConfig,
    pub scoring: ScoringConfig,
    pub selection: SelectionConfig,
    pub discovery: DiscoveryConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct EngineConfig {
    /// Strategies used when the caller names none.
    pub default_strategies: Vec<StrategySpec>,
    /// Combinations generated per run of the binary.
    pub combinations: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_strategies: vec![
                StrategySpec::new("popularity", 0.5),
                StrategySpec::new("trend", 0.5),
            ],
            combinations: 5,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StorageConfig {
    pub history_path: String,
    pub round_cache_path: String,
    pub generation_log_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            history_path: "data/draws.json".to_string(),
            round_cache_path: "data/round_cache.json".to_string(),
            generation_log_path: "data/generations.json".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        let config: AppConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {path}"))?;
        Ok(config)
    }

    /// Load `path` if it exists, otherwise use built-in defaults.
    /// A file that exists but fails to parse is still an error.
    pub fn load_or_default(path: &str) -> Result<Self> {
        if Path::new(path).exists() {
            Self::load(path)
        } else {
            warn!(path, "Config file not found, using defaults");
            Ok(Self::default())
        }
    }
}

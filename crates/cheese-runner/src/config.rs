//! Runner configuration.
//!
//! The runner itself only needs to know where the engine's config file
//! lives. Everything else comes from that file, see
//! [`CheeseConfig`].

use std::path::PathBuf;

use cheese_core::CheeseConfig;

/// Environment variable naming the config file.
const CONFIG_PATH_VAR: &str = "CHEESE_CONFIG";

/// Config file used when [`CONFIG_PATH_VAR`] is unset.
const DEFAULT_CONFIG_PATH: &str = "cheese_config.json";

/// Runner configuration loaded from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerConfig {
    /// Path to the engine config file.
    pub config_path: PathBuf,
}

impl RunnerConfig {
    /// Read runner configuration from the environment.
    pub fn from_env() -> Self {
        Self::from_var(std::env::var(CONFIG_PATH_VAR).ok())
    }

    fn from_var(value: Option<String>) -> Self {
        let config_path = value
            .filter(|v| !v.trim().is_empty())
            .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);
        Self { config_path }
    }

    /// Load the engine configuration. Never fails: a missing or malformed
    /// file yields defaults.
    pub fn load_engine_config(&self) -> CheeseConfig {
        CheeseConfig::load_or_default(&self.config_path)
    }
}

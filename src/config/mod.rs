//! Configuration module
//!
//! Handles loading and managing configuration.

mod env;

pub use env::{print_env_help, EnvBuilder, EnvConfig, EnvGuard};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::executor::default_workers;

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Units run concurrently within a collection
    pub workers: usize,

    /// Report file written after a run
    pub report_path: String,

    /// Report format (text, json, json-pretty, csv)
    pub format: String,

    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,

    /// Exit with an error status when any test fails
    pub strict_exit: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            report_path: "test.report".to_string(),
            format: "text".to_string(),
            log_level: "info".to_string(),
            strict_exit: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content =
            std::fs::read_to_string(path.as_ref()).context("Failed to read config file")?;

        let config: Self = if is_yaml(path.as_ref()) {
            serde_yaml::from_str(&content).context("Failed to parse YAML config")?
        } else {
            serde_json::from_str(&content).context("Failed to parse JSON config")?
        };

        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = if is_yaml(path.as_ref()) {
            serde_yaml::to_string(self).context("Failed to serialize config")?
        } else {
            serde_json::to_string_pretty(self).context("Failed to serialize config")?
        };

        std::fs::write(path, content).context("Failed to write config file")?;
        Ok(())
    }

    /// Apply environment overrides on top of this configuration
    pub fn merge_env(mut self, env: &EnvConfig) -> Self {
        if let Some(workers) = env.workers {
            self.workers = workers;
        }
        if let Some(report) = &env.report_path {
            self.report_path = report.clone();
        }
        if let Some(format) = &env.format {
            self.format = format.clone();
        }
        if let Some(level) = &env.log_level {
            self.log_level = level.clone();
        }
        if let Some(strict) = env.strict_exit {
            self.strict_exit = strict;
        }
        self
    }
}

fn is_yaml(path: &Path) -> bool {
    path.extension()
        .map(|e| e == "yaml" || e == "yml")
        .unwrap_or(false)
}

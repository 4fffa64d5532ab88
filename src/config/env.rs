//! Environment variable configuration
//!
//! Provides environment variable overrides for configuration.

use std::env;

/// Environment variable prefix
const ENV_PREFIX: &str = "UNITPOOL";

/// Environment configuration from environment variables
#[derive(Clone, Debug, Default)]
pub struct EnvConfig {
    /// Worker count from UNITPOOL_WORKERS
    pub workers: Option<usize>,
    /// Report path from UNITPOOL_REPORT
    pub report_path: Option<String>,
    /// Report format from UNITPOOL_FORMAT
    pub format: Option<String>,
    /// Log level from UNITPOOL_LOG
    pub log_level: Option<String>,
    /// Strict exit from UNITPOOL_STRICT
    pub strict_exit: Option<bool>,
    /// Config file from UNITPOOL_CONFIG
    pub config_file: Option<String>,
}

impl EnvConfig {
    /// Load configuration from environment variables
    pub fn load() -> Self {
        Self {
            workers: get_env_parse("WORKERS"),
            report_path: get_env("REPORT"),
            format: get_env("FORMAT"),
            log_level: get_env("LOG"),
            strict_exit: get_env_bool("STRICT"),
            config_file: get_env("CONFIG"),
        }
    }

    /// Check if any environment variables are set
    pub fn has_any(&self) -> bool {
        self.workers.is_some()
            || self.report_path.is_some()
            || self.format.is_some()
            || self.log_level.is_some()
            || self.strict_exit.is_some()
            || self.config_file.is_some()
    }
}

/// Get environment variable with prefix
fn get_env(name: &str) -> Option<String> {
    env::var(format!("{ENV_PREFIX}_{name}")).ok()
}

/// Get environment variable and parse to type
fn get_env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    get_env(name).and_then(|v| v.parse().ok())
}

/// Get environment variable as boolean
fn get_env_bool(name: &str) -> Option<bool> {
    get_env(name).map(|v| {
        matches!(
            v.to_lowercase().as_str(),
            "1" | "true" | "yes" | "on" | "enabled"
        )
    })
}

/// Builder for setting environment variables (useful for testing)
pub struct EnvBuilder {
    vars: Vec<(String, String)>,
}

impl EnvBuilder {
    pub fn new() -> Self {
        Self { vars: Vec::new() }
    }

    pub fn workers(mut self, workers: usize) -> Self {
        self.vars
            .push((format!("{ENV_PREFIX}_WORKERS"), workers.to_string()));
        self
    }

    pub fn report_path(mut self, path: impl Into<String>) -> Self {
        self.vars.push((format!("{ENV_PREFIX}_REPORT"), path.into()));
        self
    }

    pub fn strict_exit(mut self, strict: bool) -> Self {
        self.vars
            .push((format!("{ENV_PREFIX}_STRICT"), strict.to_string()));
        self
    }

    /// Apply environment variables
    pub fn apply(self) {
        for (key, value) in self.vars {
            env::set_var(key, value);
        }
    }

    /// Apply and return guard that restores on drop
    pub fn apply_scoped(self) -> EnvGuard {
        let previous: Vec<_> = self
            .vars
            .iter()
            .map(|(k, _)| (k.clone(), env::var(k).ok()))
            .collect();

        self.apply();

        EnvGuard { previous }
    }
}

impl Default for EnvBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Guard that restores environment variables on drop
pub struct EnvGuard {
    previous: Vec<(String, Option<String>)>,
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (key, value) in &self.previous {
            match value {
                Some(v) => env::set_var(key, v),
                None => env::remove_var(key),
            }
        }
    }
}

/// Print all UNITPOOL environment variables
pub fn print_env_help() {
    println!("Environment Variables:");
    println!();
    println!("  {ENV_PREFIX}_WORKERS   Units run concurrently per collection");
    println!("  {ENV_PREFIX}_REPORT    Report file path (default: test.report)");
    println!("  {ENV_PREFIX}_FORMAT    Report format (text, json, json-pretty, csv)");
    println!("  {ENV_PREFIX}_LOG       Log level (trace, debug, info, warn, error)");
    println!("  {ENV_PREFIX}_STRICT    Exit non-zero when tests fail (true/false)");
    println!("  {ENV_PREFIX}_CONFIG    Path to configuration file");
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_config_default() {
        let config = EnvConfig::default();
        assert!(config.workers.is_none());
        assert!(!config.has_any());
    }

    #[test]
    fn test_env_builder() {
        let _guard = EnvBuilder::new()
            .workers(6)
            .report_path("ci.report")
            .strict_exit(true)
            .apply_scoped();

        let config = EnvConfig::load();
        assert_eq!(config.workers, Some(6));
        assert_eq!(config.report_path, Some("ci.report".to_string()));
        assert_eq!(config.strict_exit, Some(true));
        assert!(config.has_any());
    }
}

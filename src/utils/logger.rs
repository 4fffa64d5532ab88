//! Log setup for the runner binary

use std::str::FromStr;
use tracing_subscriber::EnvFilter;

/// Verbosity of the runner's own log lines
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// `--verbose` wins over the configured level; unknown names fall back to info
    pub fn resolve(verbose: bool, configured: &str) -> Self {
        if verbose {
            LogLevel::Debug
        } else {
            configured.parse().unwrap_or_default()
        }
    }

    fn directive(self) -> &'static str {
        match self {
            LogLevel::Debug => "unitpool=debug",
            LogLevel::Info => "unitpool=info",
            LogLevel::Warn => "unitpool=warn",
            LogLevel::Error => "unitpool=error",
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "debug" | "trace" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            other => Err(format!("unknown log level: {other}")),
        }
    }
}

/// Install the global subscriber; `RUST_LOG` takes precedence when set
pub fn init_logger(level: LogLevel) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.directive()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

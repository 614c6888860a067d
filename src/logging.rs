// ABOUTME: Logging configuration and structured logging setup for observability
// ABOUTME: Configures log level and output format from the environment
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Structured logging setup built on `tracing`.

use anyhow::Result;
use std::env;
use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Output format (json, pretty, compact)
    pub format: LogFormat,
}

/// Log output format options
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogFormat {
    /// `JSON` format for production logging
    Json,
    /// Pretty format for development
    Pretty,
    /// Compact format for space-constrained environments
    Compact,
}

impl LogFormat {
    /// Parse from string with fallback
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => Self::Json,
            "compact" => Self::Compact,
            _ => Self::Pretty,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: LogFormat::Pretty,
        }
    }
}

impl LoggingConfig {
    /// Build logging configuration from `LOG_LEVEL` and `LOG_FORMAT`
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            level: env::var("LOG_LEVEL").unwrap_or(defaults.level),
            format: env::var("LOG_FORMAT")
                .map(|s| LogFormat::from_str_or_default(&s))
                .unwrap_or(defaults.format),
        }
    }
}

/// Initialize the global subscriber from environment configuration.
///
/// `RUST_LOG` takes precedence over `LOG_LEVEL` for filter directives.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init_from_env() -> Result<()> {
    init(&LoggingConfig::from_env())
}

/// Initialize the global subscriber with an explicit configuration
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init(config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.clone()));

    let registry = tracing_subscriber::registry().with(filter);
    match config.format {
        LogFormat::Json => registry.with(fmt::layer().json()).try_init()?,
        LogFormat::Pretty => registry.with(fmt::layer()).try_init()?,
        LogFormat::Compact => registry.with(fmt::layer().compact()).try_init()?,
    }
    Ok(())
}

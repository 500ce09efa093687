//! Structured logging
//!
//! Installs a `tracing` subscriber for the process embedding this crate.
//! Library code only emits events; nothing here runs unless a host calls
//! [`init_logging`].

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry};

/// Logging error types
#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("invalid log level '{level}': {reason}")]
    InvalidLevel { level: String, reason: String },

    #[error("initialization error: {0}")]
    Init(String),
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingConfig {
    /// Install a subscriber at startup
    pub enabled: bool,
    /// Service name reported in the startup event
    pub service_name: String,
    /// `EnvFilter` directive, e.g. `info` or `fetchgate=debug,warn`
    pub log_level: String,
    /// Output format
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            service_name: "fetchgate".to_string(),
            log_level: "info".to_string(),
            format: LogFormat::Json,
        }
    }
}

/// Output format for log lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// One JSON object per event
    #[default]
    Json,
    /// Human-readable lines
    Text,
}

/// Build the filter for `config`, rejecting directives `EnvFilter` can't parse.
pub fn build_filter(config: &LoggingConfig) -> Result<EnvFilter, LoggingError> {
    EnvFilter::try_new(&config.log_level).map_err(|e| LoggingError::InvalidLevel {
        level: config.log_level.clone(),
        reason: e.to_string(),
    })
}

/// Initialize logging with the given configuration
///
/// Returns `Ok(())` without touching global state when logging is disabled.
/// A second initialization in the same process reports [`LoggingError::Init`].
pub fn init_logging(config: &LoggingConfig) -> Result<(), LoggingError> {
    if !config.enabled {
        return Ok(());
    }

    let env_filter = build_filter(config)?;

    let result = match config.format {
        LogFormat::Json => Registry::default()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .try_init(),
        LogFormat::Text => Registry::default()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .try_init(),
    };
    result.map_err(|e| LoggingError::Init(e.to_string()))?;

    info!(service = %config.service_name, "logging initialized");
    Ok(())
}

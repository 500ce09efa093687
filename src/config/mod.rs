//! Configuration
//!
//! JSON5 configuration file for hosts embedding the builder: logging setup and
//! the error code used by fallback envelopes. Every section is optional.
//!
//! ```json5
//! {
//!   logging: { enabled: true, format: "text", logLevel: "fetchgate=debug" },
//!   responses: { criticalCode: "error.api.fetch.critical" },
//! }
//! ```

pub mod schema;
pub mod types;

use std::path::Path;

use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::request::ValidationIssue;

pub use schema::generate_config_schema;
pub use types::{Config, ResponsesConfig};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(String),

    #[error("invalid config: {}", format_issues(.0))]
    Invalid(Vec<ValidationIssue>),
}

fn format_issues(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl Config {
    /// Parse and validate a JSON5 document.
    pub fn from_json5_str(raw: &str) -> Result<Self, ConfigError> {
        let value =
            json5::from_str::<Value>(raw).map_err(|e| ConfigError::Parse(e.to_string()))?;
        let config: Config = match value {
            Value::Null => Config::default(),
            value => serde_json::from_value(value).map_err(|e| ConfigError::Parse(e.to_string()))?,
        };
        config.validate().map_err(ConfigError::Invalid)?;
        Ok(config)
    }

    /// Read, parse and validate a config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_json5_str(&raw)?;
        debug!(path = %path.display(), "config loaded");
        Ok(config)
    }
}

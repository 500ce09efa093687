//! Typed configuration structures
//!
//! Provides strongly-typed access to configuration values with validation
//! and default values.

use serde::{Deserialize, Serialize};

use crate::logging::LoggingConfig;
use crate::request::ValidationIssue;
use crate::response::DEFAULT_CRITICAL_CODE;

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Config {
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Response envelope configuration
    #[serde(default)]
    pub responses: ResponsesConfig,
}

impl Config {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), Vec<ValidationIssue>> {
        let mut issues = Vec::new();

        if let Err(e) = crate::logging::build_filter(&self.logging) {
            issues.push(ValidationIssue::new("logging.logLevel", e.to_string()));
        }

        if let Err(e) = self.responses.validate() {
            issues.push(ValidationIssue::new("responses.criticalCode", e));
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(issues)
        }
    }
}

/// Response envelope configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponsesConfig {
    /// Error code used by the fallback and by `critical` responses without a code
    #[serde(default = "default_critical_code")]
    pub critical_code: String,
}

fn default_critical_code() -> String {
    DEFAULT_CRITICAL_CODE.to_string()
}

impl Default for ResponsesConfig {
    fn default() -> Self {
        Self {
            critical_code: default_critical_code(),
        }
    }
}

impl ResponsesConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.critical_code.trim().is_empty() {
            return Err("criticalCode must not be empty".to_string());
        }
        if self.critical_code.chars().any(char::is_whitespace) {
            return Err(format!(
                "criticalCode '{}' must not contain whitespace",
                self.critical_code
            ));
        }
        Ok(())
    }
}

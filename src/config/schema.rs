//! JSON Schema Generation
//!
//! Generates JSON Schema for fetchgate configuration files.
//! Based on draft-07 of the JSON Schema specification.

use serde_json::json;
use serde_json::Value;

use crate::response::DEFAULT_CRITICAL_CODE;

/// Generate the complete JSON schema for fetchgate configuration
pub fn generate_config_schema() -> Value {
    json!({
        "$schema": "http://json-schema.org/draft-07/schema#",
        "title": "Fetchgate Configuration",
        "description": "Configuration schema for the fetchgate response layer",
        "type": "object",
        "properties": {
            "logging": generate_logging_schema(),
            "responses": generate_responses_schema(),
        },
        "additionalProperties": false
    })
}

fn generate_logging_schema() -> Value {
    json!({
        "type": "object",
        "description": "Structured logging configuration",
        "properties": {
            "enabled": {
                "type": "boolean",
                "description": "Install a tracing subscriber at startup",
                "default": false
            },
            "serviceName": {
                "type": "string",
                "description": "Service name reported in the startup event",
                "default": "fetchgate"
            },
            "logLevel": {
                "type": "string",
                "description": "EnvFilter directive (e.g. \"info\" or \"fetchgate=debug,warn\")",
                "default": "info"
            },
            "format": {
                "type": "string",
                "enum": ["json", "text"],
                "default": "json"
            }
        }
    })
}

fn generate_responses_schema() -> Value {
    json!({
        "type": "object",
        "description": "Response envelope configuration",
        "properties": {
            "criticalCode": {
                "type": "string",
                "description": "Error code for fallback envelopes and critical responses without a code",
                "minLength": 1,
                "default": DEFAULT_CRITICAL_CODE
            }
        }
    })
}

//! Schema seam for inbound requests.

use std::fmt;
use std::marker::PhantomData;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// A single reason a value failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub path: String,
    pub message: String,
}

impl ValidationIssue {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

/// Fault inside the validation engine itself, as opposed to bad input.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("schema engine error: {0}")]
    Engine(String),
}

/// Outcome of a schema parse that ran to completion.
#[derive(Debug, Clone, PartialEq)]
pub enum SafeParse<T> {
    Success(T),
    Failure { issues: Vec<ValidationIssue> },
}

/// Validates and coerces a raw request.
///
/// Invalid input must be reported as [`SafeParse::Failure`]; `Err` is
/// reserved for the engine breaking down.
#[async_trait]
pub trait RequestSchema: Send + Sync {
    type Output: Send;

    async fn safe_parse(&self, raw: &Value) -> Result<SafeParse<Self::Output>, SchemaError>;
}

/// Semantic checks run after a request deserializes.
pub trait Validate {
    fn validate(&self) -> Result<(), Vec<ValidationIssue>> {
        Ok(())
    }
}

/// Schema backed by a serde type: deserialization coerces, [`Validate`] checks.
pub struct TypedSchema<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> TypedSchema<T> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for TypedSchema<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for TypedSchema<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedSchema")
            .field("type", &std::any::type_name::<T>())
            .finish()
    }
}

#[async_trait]
impl<T> RequestSchema for TypedSchema<T>
where
    T: DeserializeOwned + Validate + Send + 'static,
{
    type Output = T;

    async fn safe_parse(&self, raw: &Value) -> Result<SafeParse<T>, SchemaError> {
        let parsed = match T::deserialize(raw) {
            Ok(parsed) => parsed,
            Err(e) => {
                return Ok(SafeParse::Failure {
                    issues: vec![ValidationIssue::new("", e.to_string())],
                })
            }
        };

        match parsed.validate() {
            Ok(()) => Ok(SafeParse::Success(parsed)),
            Err(issues) => Ok(SafeParse::Failure { issues }),
        }
    }
}

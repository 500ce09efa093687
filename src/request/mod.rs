//! Request normalization
//!
//! Runs an inbound request through a [`RequestSchema`] before any fetch logic
//! sees it. Callers get a boolean gate: either the coerced request or
//! `{success: false}`. Bad input and a broken schema engine look the same
//! from the outside.

pub mod schema;

use std::panic::AssertUnwindSafe;

use futures_util::FutureExt;
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;
use tracing::{debug, warn};

pub use schema::{RequestSchema, SafeParse, SchemaError, TypedSchema, Validate, ValidationIssue};

/// Result of normalizing a request.
#[derive(Debug, Clone, PartialEq)]
pub enum Normalized<T> {
    Success { data: T },
    Failure,
}

impl<T> Normalized<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, Normalized::Success { .. })
    }

    pub fn into_data(self) -> Option<T> {
        match self {
            Normalized::Success { data } => Some(data),
            Normalized::Failure => None,
        }
    }
}

impl<T: Serialize> Serialize for Normalized<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Normalized::Success { data } => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("success", &true)?;
                map.serialize_entry("data", data)?;
                map.end()
            }
            Normalized::Failure => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("success", &false)?;
                map.end()
            }
        }
    }
}

/// Validate `raw` against `schema`. Never fails and never panics outward.
pub async fn normalize_request<S>(schema: &S, raw: &Value) -> Normalized<S::Output>
where
    S: RequestSchema + ?Sized,
{
    match AssertUnwindSafe(schema.safe_parse(raw)).catch_unwind().await {
        Ok(Ok(SafeParse::Success(data))) => Normalized::Success { data },
        Ok(Ok(SafeParse::Failure { issues })) => {
            debug!(issues = issues.len(), "request rejected by schema");
            Normalized::Failure
        }
        Ok(Err(err)) => {
            warn!(error = %err, "request schema engine failed");
            Normalized::Failure
        }
        Err(_) => {
            warn!("request schema engine panicked");
            Normalized::Failure
        }
    }
}

//! Envelope types shared by the response builder and the HTTP hand-off.

use std::fmt;
use std::str::FromStr;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::BuildError;

/// Error code used whenever a caller-supplied code is missing or a build fails.
pub const DEFAULT_CRITICAL_CODE: &str = "error.api.fetch.critical";

/// The closed set of outcomes a fetch can be shaped into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResponseKind {
    Error,
    Redirect,
    Tunnel,
    Picker,
    Critical,
}

impl ResponseKind {
    pub const ALL: [ResponseKind; 5] = [
        ResponseKind::Error,
        ResponseKind::Redirect,
        ResponseKind::Tunnel,
        ResponseKind::Picker,
        ResponseKind::Critical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseKind::Error => "error",
            ResponseKind::Redirect => "redirect",
            ResponseKind::Tunnel => "tunnel",
            ResponseKind::Picker => "picker",
            ResponseKind::Critical => "critical",
        }
    }

    /// HTTP status paired with this kind on the success path.
    pub fn status_code(&self) -> u16 {
        match self {
            ResponseKind::Error => 400,
            ResponseKind::Critical => 500,
            ResponseKind::Redirect | ResponseKind::Tunnel | ResponseKind::Picker => 200,
        }
    }
}

impl fmt::Display for ResponseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResponseKind {
    type Err = BuildError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ResponseKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| BuildError::UnknownKind(s.to_string()))
    }
}

/// Loosely-typed payload handed to the builder.
///
/// Every recognized field is optional and kept as raw JSON; which ones are
/// read depends on the [`ResponseKind`], and only the fields a branch reads
/// are coerced (see [`ResponseData::code`] and [`ResponseData::filename`]).
/// Unrecognized fields are kept in `extra` so a stream factory can see the
/// whole bag it was given.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,

    /// Media location. Opaque for tunnels, passed through as-is otherwise.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picker: Option<Value>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ResponseData {
    /// Coerce an untyped bag. `null` counts as an empty bag.
    pub fn from_value(value: Value) -> Result<Self, BuildError> {
        match value {
            Value::Null => Ok(Self::default()),
            Value::Object(_) => {
                serde_json::from_value(value).map_err(|e| BuildError::MalformedData(e.to_string()))
            }
            other => Err(BuildError::MalformedData(format!(
                "expected an object, got {}",
                json_type_name(&other)
            ))),
        }
    }

    /// `code` as a string. `null` and absence both read as `None`.
    pub fn code(&self) -> Result<Option<&str>, BuildError> {
        string_field("code", self.code.as_ref())
    }

    /// `filename` as a string. `null` and absence both read as `None`.
    pub fn filename(&self) -> Result<Option<&str>, BuildError> {
        string_field("filename", self.filename.as_ref())
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(Value::String(code.into()));
        self
    }

    pub fn with_context(mut self, context: Value) -> Self {
        self.context = Some(context);
        self
    }

    pub fn with_url(mut self, url: impl Into<Value>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(Value::String(filename.into()));
        self
    }

    pub fn with_picker(mut self, picker: Value) -> Self {
        self.picker = Some(picker);
        self
    }
}

fn string_field<'a>(name: &str, value: Option<&'a Value>) -> Result<Option<&'a str>, BuildError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.as_str())),
        Some(other) => Err(BuildError::MalformedData(format!(
            "{} must be a string, got {}",
            name,
            json_type_name(other)
        ))),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorDetail {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,
}

/// Body of an [`Envelope`], tagged by its `status` field.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum EnvelopeBody {
    Error {
        error: ErrorDetail,
        #[serde(skip_serializing_if = "is_false")]
        critical: bool,
    },
    Redirect {
        #[serde(skip_serializing_if = "Option::is_none")]
        url: Option<Value>,
        #[serde(skip_serializing_if = "Option::is_none")]
        filename: Option<String>,
    },
    Tunnel {
        url: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        filename: Option<String>,
    },
    Picker {
        #[serde(skip_serializing_if = "Option::is_none")]
        picker: Option<Value>,
        #[serde(skip_serializing_if = "Option::is_none")]
        audio: Option<Value>,
        #[serde(rename = "audioFilename", skip_serializing_if = "Option::is_none")]
        audio_filename: Option<String>,
    },
    Critical {
        error: ErrorDetail,
        critical: bool,
    },
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl EnvelopeBody {
    /// The `status` tag this body serializes with.
    pub fn tag(&self) -> &'static str {
        match self {
            EnvelopeBody::Error { .. } => "error",
            EnvelopeBody::Redirect { .. } => "redirect",
            EnvelopeBody::Tunnel { .. } => "tunnel",
            EnvelopeBody::Picker { .. } => "picker",
            EnvelopeBody::Critical { .. } => "critical",
        }
    }
}

/// HTTP status plus JSON body, ready for the transport layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Envelope {
    pub status: u16,
    pub body: EnvelopeBody,
}

impl Envelope {
    /// The envelope returned whenever building fails.
    pub fn fallback() -> Self {
        Self::fallback_with_code(DEFAULT_CRITICAL_CODE)
    }

    pub fn fallback_with_code(code: impl Into<String>) -> Self {
        Self {
            status: 500,
            body: EnvelopeBody::Error {
                error: ErrorDetail {
                    code: Some(code.into()),
                    context: None,
                },
                critical: true,
            },
        }
    }

    /// An explicit critical outcome carrying the caller's code.
    pub fn critical(code: impl Into<String>) -> Self {
        Self {
            status: 500,
            body: EnvelopeBody::Critical {
                error: ErrorDetail {
                    code: Some(code.into()),
                    context: None,
                },
                critical: true,
            },
        }
    }

    /// True for the generic 500 shape produced by a build fault.
    pub fn is_fallback(&self) -> bool {
        matches!(self.body, EnvelopeBody::Error { critical: true, .. })
    }

    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or_else(|_| {
            serde_json::json!({
                "status": 500,
                "body": {
                    "status": "error",
                    "error": { "code": DEFAULT_CRITICAL_CODE },
                    "critical": true
                }
            })
        })
    }
}

impl IntoResponse for Envelope {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.body)).into_response()
    }
}

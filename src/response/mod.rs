//! Response envelope builder
//!
//! Turns an internal fetch outcome into the `{status, body}` pair the HTTP
//! layer writes out. Building never fails from the caller's point of view:
//! unknown kinds, malformed payloads and failing stream factories all collapse
//! into the fallback envelope (500, `error.api.fetch.critical`).
//!
//! | kind       | status | body                                                     |
//! |------------|--------|----------------------------------------------------------|
//! | `error`    | 400    | `{status, error: {code, context}}`                       |
//! | `redirect` | 200    | `{status, url, filename}`                                |
//! | `tunnel`   | 200    | `{status, url: <stream factory>, filename}`              |
//! | `picker`   | 200    | `{status, picker, audio, audioFilename}`                 |
//! | `critical` | 500    | `{status, error: {code}, critical: true}`                |
//!
//! # Example
//!
//! ```ignore
//! use fetchgate::response::{create_response, stream_fn, ResponseData, ResponseKind};
//!
//! let streams = stream_fn(|_| Ok("https://api.example.com/tunnel?id=1".to_string()));
//! let envelope = create_response(
//!     ResponseKind::Redirect,
//!     &ResponseData::default().with_url("https://cdn.example.com/a.mp4"),
//!     &streams,
//! )
//! .await;
//! assert_eq!(envelope.status, 200);
//! ```

pub mod envelope;
pub mod stream;

use std::panic::AssertUnwindSafe;

use futures_util::FutureExt;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn, Instrument};

use crate::config::ResponsesConfig;

pub use envelope::{
    Envelope, EnvelopeBody, ErrorDetail, ResponseData, ResponseKind, DEFAULT_CRITICAL_CODE,
};
pub use stream::{stream_fn, FnStreamFactory, StreamError, StreamFactory};

/// Faults raised while building an envelope. Never returned to callers of
/// the public entry points; they only reach the logs.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("unknown response kind: {0}")]
    UnknownKind(String),

    #[error("malformed response data: {0}")]
    MalformedData(String),

    #[error(transparent)]
    Stream(#[from] StreamError),

    #[error("stream factory panicked")]
    StreamPanicked,
}

/// Envelope builder bound to a stream factory.
#[derive(Debug, Clone)]
pub struct ResponseBuilder<F> {
    streams: F,
    critical_code: String,
}

impl<F: StreamFactory> ResponseBuilder<F> {
    pub fn new(streams: F) -> Self {
        Self {
            streams,
            critical_code: DEFAULT_CRITICAL_CODE.to_string(),
        }
    }

    /// Builder whose default critical code comes from configuration.
    pub fn with_config(streams: F, config: &ResponsesConfig) -> Self {
        let critical_code = if config.critical_code.is_empty() {
            DEFAULT_CRITICAL_CODE.to_string()
        } else {
            config.critical_code.clone()
        };
        Self {
            streams,
            critical_code,
        }
    }

    pub fn critical_code(&self) -> &str {
        &self.critical_code
    }

    /// Build the envelope for `kind`. Always returns a well-formed envelope.
    pub async fn build(&self, kind: ResponseKind, data: &ResponseData) -> Envelope {
        let span = tracing::debug_span!("create_response", kind = %kind);
        match self.try_build(kind, data).instrument(span).await {
            Ok(envelope) => {
                debug!(kind = %kind, status = envelope.status, "response envelope built");
                envelope
            }
            Err(err) => {
                warn!(kind = %kind, error = %err, "response build failed, returning fallback");
                self.fallback()
            }
        }
    }

    /// Build from an untyped kind tag and payload.
    pub async fn build_from_value(&self, kind: &str, data: Value) -> Envelope {
        let parsed = kind
            .parse::<ResponseKind>()
            .and_then(|kind| ResponseData::from_value(data).map(|data| (kind, data)));

        match parsed {
            Ok((kind, data)) => self.build(kind, &data).await,
            Err(err) => {
                warn!(kind, error = %err, "rejected response input, returning fallback");
                self.fallback()
            }
        }
    }

    fn fallback(&self) -> Envelope {
        Envelope::fallback_with_code(self.critical_code.clone())
    }

    async fn try_build(&self, kind: ResponseKind, data: &ResponseData) -> Result<Envelope, BuildError> {
        let body = match kind {
            ResponseKind::Error => EnvelopeBody::Error {
                error: ErrorDetail {
                    code: data.code()?.map(str::to_string),
                    context: data.context.clone(),
                },
                critical: false,
            },
            ResponseKind::Redirect => EnvelopeBody::Redirect {
                url: data.url.clone(),
                filename: data.filename()?.map(str::to_string),
            },
            ResponseKind::Tunnel => {
                let filename = data.filename()?.map(str::to_string);
                EnvelopeBody::Tunnel {
                    url: self.create_stream(data).await?,
                    filename,
                }
            }
            ResponseKind::Picker => EnvelopeBody::Picker {
                picker: data.picker.clone(),
                audio: data.url.clone(),
                audio_filename: data.filename()?.map(str::to_string),
            },
            // Short-circuits the generic path so the caller's code survives.
            ResponseKind::Critical => {
                let code = match data.code()? {
                    Some(code) if !code.is_empty() => code,
                    _ => self.critical_code.as_str(),
                };
                return Ok(Envelope::critical(code));
            }
        };

        Ok(Envelope {
            status: kind.status_code(),
            body,
        })
    }

    async fn create_stream(&self, data: &ResponseData) -> Result<String, BuildError> {
        let url = AssertUnwindSafe(self.streams.create_stream(data))
            .catch_unwind()
            .await
            .map_err(|_| BuildError::StreamPanicked)??;
        Ok(url)
    }
}

/// Build an envelope with the default critical code.
pub async fn create_response<F>(kind: ResponseKind, data: &ResponseData, streams: &F) -> Envelope
where
    F: StreamFactory + ?Sized,
{
    ResponseBuilder::new(streams).build(kind, data).await
}

/// Build an envelope from an untyped kind tag and JSON payload.
pub async fn create_response_from_value<F>(kind: &str, data: Value, streams: &F) -> Envelope
where
    F: StreamFactory + ?Sized,
{
    ResponseBuilder::new(streams).build_from_value(kind, data).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tunnel_streams() -> FnStreamFactory<impl Fn(&ResponseData) -> Result<String, StreamError>> {
        stream_fn(|data: &ResponseData| match &data.url {
            Some(_) => Ok("https://api.example.com/tunnel?id=abc".to_string()),
            None => Err(StreamError::MissingUrl),
        })
    }

    fn fallback_json() -> Value {
        json!({
            "status": 500,
            "body": {
                "status": "error",
                "error": { "code": "error.api.fetch.critical" },
                "critical": true
            }
        })
    }

    #[tokio::test]
    async fn test_error_envelope() {
        let data = ResponseData::default()
            .with_code("E1")
            .with_context(json!({ "a": 1 }));
        let envelope = create_response(ResponseKind::Error, &data, &tunnel_streams()).await;

        assert_eq!(
            envelope.to_json(),
            json!({
                "status": 400,
                "body": { "status": "error", "error": { "code": "E1", "context": { "a": 1 } } }
            })
        );
    }

    #[tokio::test]
    async fn test_error_envelope_with_empty_data() {
        let envelope =
            create_response(ResponseKind::Error, &ResponseData::default(), &tunnel_streams()).await;
        assert_eq!(envelope.status, 400);
        assert_eq!(envelope.to_json()["body"], json!({ "status": "error", "error": {} }));
    }

    #[tokio::test]
    async fn test_redirect_envelope() {
        let data = ResponseData::default()
            .with_url("https://cdn.example.com/v.mp4")
            .with_filename("v.mp4");
        let envelope = create_response(ResponseKind::Redirect, &data, &tunnel_streams()).await;

        assert_eq!(
            envelope.to_json(),
            json!({
                "status": 200,
                "body": {
                    "status": "redirect",
                    "url": "https://cdn.example.com/v.mp4",
                    "filename": "v.mp4"
                }
            })
        );
    }

    #[tokio::test]
    async fn test_tunnel_envelope_uses_factory_url() {
        let data = ResponseData::default()
            .with_url(json!(["https://a.example/v", "https://a.example/a"]))
            .with_filename("merged.mp4");
        let envelope = create_response(ResponseKind::Tunnel, &data, &tunnel_streams()).await;

        assert_eq!(
            envelope.to_json(),
            json!({
                "status": 200,
                "body": {
                    "status": "tunnel",
                    "url": "https://api.example.com/tunnel?id=abc",
                    "filename": "merged.mp4"
                }
            })
        );
    }

    #[tokio::test]
    async fn test_tunnel_factory_error_falls_back() {
        let envelope =
            create_response(ResponseKind::Tunnel, &ResponseData::default(), &tunnel_streams()).await;
        assert_eq!(envelope.to_json(), fallback_json());
    }

    #[tokio::test]
    async fn test_tunnel_factory_panic_falls_back() {
        let streams = stream_fn(|_: &ResponseData| -> Result<String, StreamError> {
            panic!("stream store unavailable")
        });
        let data = ResponseData::default().with_url("https://a.example/v");
        let envelope = create_response(ResponseKind::Tunnel, &data, &streams).await;
        assert_eq!(envelope.to_json(), fallback_json());
    }

    #[tokio::test]
    async fn test_picker_envelope() {
        let data = ResponseData::default()
            .with_picker(json!([1, 2]))
            .with_url("u")
            .with_filename("f");
        let envelope = create_response(ResponseKind::Picker, &data, &tunnel_streams()).await;

        assert_eq!(
            envelope.to_json(),
            json!({
                "status": 200,
                "body": { "status": "picker", "picker": [1, 2], "audio": "u", "audioFilename": "f" }
            })
        );
    }

    #[tokio::test]
    async fn test_picker_envelope_with_empty_data() {
        let envelope =
            create_response(ResponseKind::Picker, &ResponseData::default(), &tunnel_streams()).await;
        assert_eq!(
            envelope.to_json(),
            json!({ "status": 200, "body": { "status": "picker" } })
        );
    }

    #[tokio::test]
    async fn test_critical_keeps_caller_code() {
        let data = ResponseData::default().with_code("X");
        let envelope = create_response(ResponseKind::Critical, &data, &tunnel_streams()).await;
        assert_eq!(
            envelope.to_json(),
            json!({
                "status": 500,
                "body": { "status": "critical", "error": { "code": "X" }, "critical": true }
            })
        );
    }

    #[tokio::test]
    async fn test_critical_defaults_code() {
        for data in [ResponseData::default(), ResponseData::default().with_code("")] {
            let envelope = create_response(ResponseKind::Critical, &data, &tunnel_streams()).await;
            assert_eq!(envelope.status, 500);
            assert_eq!(
                envelope.to_json()["body"]["error"]["code"],
                "error.api.fetch.critical"
            );
        }
    }

    #[tokio::test]
    async fn test_critical_ignores_foreign_fields() {
        let data = ResponseData::default()
            .with_code("X")
            .with_url("https://cdn.example.com/v.mp4")
            .with_context(json!({ "service": "vimeo" }));
        let envelope = create_response(ResponseKind::Critical, &data, &tunnel_streams()).await;
        assert_eq!(
            envelope.to_json()["body"],
            json!({ "status": "critical", "error": { "code": "X" }, "critical": true })
        );
    }

    #[tokio::test]
    async fn test_unknown_kind_falls_back() {
        for kind in ["", "stream", "Redirect", "local-processing"] {
            let envelope =
                create_response_from_value(kind, json!({ "url": "u" }), &tunnel_streams()).await;
            assert_eq!(envelope.to_json(), fallback_json(), "kind {:?}", kind);
        }
    }

    #[tokio::test]
    async fn test_malformed_data_falls_back() {
        let envelope =
            create_response_from_value("redirect", json!({ "filename": ["x"] }), &tunnel_streams())
                .await;
        assert_eq!(envelope.to_json(), fallback_json());

        let envelope = create_response_from_value("error", json!(42), &tunnel_streams()).await;
        assert_eq!(envelope.to_json(), fallback_json());

        let envelope =
            create_response_from_value("critical", json!({ "code": 503 }), &tunnel_streams()).await;
        assert_eq!(envelope.to_json(), fallback_json());

        let envelope = create_response_from_value(
            "tunnel",
            json!({ "url": "u", "filename": false }),
            &tunnel_streams(),
        )
        .await;
        assert_eq!(envelope.to_json(), fallback_json());
    }

    #[tokio::test]
    async fn test_fields_outside_the_branch_are_not_coerced() {
        let envelope = create_response_from_value(
            "redirect",
            json!({ "url": "https://cdn.example/v.mp4", "code": 404 }),
            &tunnel_streams(),
        )
        .await;
        assert_eq!(
            envelope.to_json(),
            json!({
                "status": 200,
                "body": { "status": "redirect", "url": "https://cdn.example/v.mp4" }
            })
        );

        let envelope = create_response_from_value(
            "critical",
            json!({ "code": "X", "filename": 7 }),
            &tunnel_streams(),
        )
        .await;
        assert_eq!(
            envelope.to_json(),
            json!({
                "status": 500,
                "body": { "status": "critical", "error": { "code": "X" }, "critical": true }
            })
        );

        let envelope = create_response_from_value(
            "error",
            json!({ "code": "E1", "filename": { "a": 1 } }),
            &tunnel_streams(),
        )
        .await;
        assert_eq!(
            envelope.to_json(),
            json!({ "status": 400, "body": { "status": "error", "error": { "code": "E1" } } })
        );

        let envelope = create_response_from_value(
            "picker",
            json!({ "picker": [1], "code": ["x"] }),
            &tunnel_streams(),
        )
        .await;
        assert_eq!(
            envelope.to_json(),
            json!({ "status": 200, "body": { "status": "picker", "picker": [1] } })
        );
    }

    #[tokio::test]
    async fn test_value_entry_accepts_null_data() {
        let envelope = create_response_from_value("redirect", Value::Null, &tunnel_streams()).await;
        assert_eq!(
            envelope.to_json(),
            json!({ "status": 200, "body": { "status": "redirect" } })
        );
    }

    #[tokio::test]
    async fn test_configured_critical_code() {
        let config = ResponsesConfig {
            critical_code: "error.api.unreachable".to_string(),
        };
        let builder = ResponseBuilder::with_config(tunnel_streams(), &config);
        assert_eq!(builder.critical_code(), "error.api.unreachable");

        let envelope = builder.build_from_value("nope", json!({})).await;
        assert_eq!(envelope.status, 500);
        assert_eq!(
            envelope.to_json()["body"]["error"]["code"],
            "error.api.unreachable"
        );

        let envelope = builder
            .build(ResponseKind::Critical, &ResponseData::default())
            .await;
        assert_eq!(
            envelope.to_json()["body"]["error"]["code"],
            "error.api.unreachable"
        );
    }

    #[tokio::test]
    async fn test_empty_configured_code_uses_default() {
        let config = ResponsesConfig {
            critical_code: String::new(),
        };
        let builder = ResponseBuilder::with_config(tunnel_streams(), &config);
        assert_eq!(builder.critical_code(), DEFAULT_CRITICAL_CODE);
    }

    #[tokio::test]
    async fn test_status_always_matches_body_tag() {
        let data = ResponseData::default().with_url("u").with_code("c");
        for kind in ResponseKind::ALL {
            let envelope = create_response(kind, &data, &tunnel_streams()).await;
            assert_eq!(envelope.body.tag(), kind.as_str());
            assert_eq!(envelope.status, kind.status_code());
        }
    }
}

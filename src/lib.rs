//! fetchgate library
//!
//! Response shaping and request validation for a media-fetching API:
//!
//! - [`response`]: turns fetch outcomes into `{status, body}` envelopes, never failing
//! - [`request`]: validates inbound requests against a schema into a pass/fail gate
//! - [`network`]: generates private IPv4 addresses for outbound request metadata
//!
//! plus the [`config`] and [`logging`] support a host process needs.

pub mod config;
pub mod logging;
pub mod network;
pub mod request;
pub mod response;

pub use network::get_ip;
pub use request::normalize_request;
pub use response::{create_response, create_response_from_value, Envelope, ResponseKind};

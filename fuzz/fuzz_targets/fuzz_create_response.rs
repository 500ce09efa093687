#![no_main]

use std::sync::LazyLock;

use libfuzzer_sys::fuzz_target;
use serde_json::Value;
use tokio::runtime::Runtime;

use fetchgate::response::{create_response_from_value, stream_fn, ResponseData, StreamError};

static RUNTIME: LazyLock<Runtime> = LazyLock::new(|| {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("fuzz runtime")
});

fuzz_target!(|data: &[u8]| {
    // First line is the kind tag, the rest is the payload.
    let (kind, payload) = match data.iter().position(|&b| b == b'\n') {
        Some(idx) => (&data[..idx], &data[idx + 1..]),
        None => (data, &[][..]),
    };
    let kind = String::from_utf8_lossy(kind);
    let payload: Value = serde_json::from_slice(payload).unwrap_or(Value::Null);

    let streams = stream_fn(|data: &ResponseData| match &data.url {
        Some(Value::String(url)) if !url.is_empty() => Ok(format!("https://fuzz.local/{}", url.len())),
        Some(_) => Err(StreamError::Unsupported("non-string url".to_string())),
        None => Err(StreamError::MissingUrl),
    });

    let envelope = RUNTIME.block_on(create_response_from_value(&kind, payload, &streams));

    // Building must always land on one of the three documented statuses.
    assert!(matches!(envelope.status, 200 | 400 | 500));
    let json = envelope.to_json();
    assert!(json["body"]["status"].is_string());
});

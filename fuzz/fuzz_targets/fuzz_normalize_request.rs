#![no_main]

use std::sync::LazyLock;

use libfuzzer_sys::fuzz_target;
use serde::Deserialize;
use serde_json::Value;
use tokio::runtime::Runtime;

use fetchgate::request::{normalize_request, TypedSchema, Validate, ValidationIssue};

static RUNTIME: LazyLock<Runtime> = LazyLock::new(|| {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("fuzz runtime")
});

#[derive(Debug, Deserialize)]
struct FuzzRequest {
    url: String,
}

impl Validate for FuzzRequest {
    fn validate(&self) -> Result<(), Vec<ValidationIssue>> {
        if self.url.is_empty() {
            return Err(vec![ValidationIssue::new("url", "required")]);
        }
        Ok(())
    }
}

fuzz_target!(|data: &[u8]| {
    let raw: Value = match serde_json::from_slice(data) {
        Ok(v) => v,
        Err(_) => return,
    };

    let schema = TypedSchema::<FuzzRequest>::new();
    let result = RUNTIME.block_on(normalize_request(&schema, &raw));

    // Success implies the payload carried a non-empty url string.
    if let Some(request) = result.into_data() {
        assert!(!request.url.is_empty());
    }
});

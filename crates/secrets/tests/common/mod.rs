//! Shared helpers for integration tests

#![allow(dead_code)]

use serde_json::{Value, json};
use tracing_subscriber::EnvFilter;

/// Install a fmt subscriber once per test binary; controlled by `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("mgsecret=debug")),
        )
        .with_test_writer()
        .try_init();
}

/// Minimal valid configuration body
pub fn default_config() -> Value {
    json!({
        "api_key": "apiKey123",
        "domain": "example.com",
    })
}

//! Integration tests for the `config` path
//!
//! These go through `Backend::handle_request` the way the host does and
//! check what a caller can observe.

mod common;

use mgsecret::testing::HostHarness;
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::{Value, json};

#[tokio::test]
async fn test_initial_config_is_empty() {
    common::init_tracing();
    let host = HostHarness::new();

    let response = host.read_config().await.unwrap();

    assert!(response.is_none(), "unexpected initial config: {response:?}");
}

#[rstest]
#[case::only_domain(json!({"domain": "example.com"}), "api_key")]
#[case::only_api_key(json!({"api_key": "apiKey123"}), "domain")]
#[case::empty_api_key(json!({"api_key": "", "domain": "example.com"}), "api_key")]
#[case::null_domain(json!({"api_key": "apiKey123", "domain": null}), "domain")]
#[case::ttl_only(json!({"ttl": "1h"}), "api_key")]
#[tokio::test]
async fn test_write_missing_required_field(#[case] body: Value, #[case] field: &str) {
    // GIVEN: A fresh mount
    let host = HostHarness::new();

    // WHEN: A write omits a required field
    let response = host.write_config(body).await.unwrap().unwrap();

    // THEN: The error names the field and nothing was saved or validated
    assert!(response.is_error());
    assert!(
        response.error_message().unwrap().contains(field),
        "{:?}",
        response.error_message()
    );
    assert!(host.read_config().await.unwrap().is_none());
    assert!(host.storage().is_empty());
    assert_eq!(host.provider().validation_calls(), 0);
}

#[tokio::test]
async fn test_api_key_cannot_be_read() {
    let host = HostHarness::new();
    assert!(host.write_config(common::default_config()).await.unwrap().is_none());

    let response = host.read_config().await.unwrap().expect("config saved");

    assert!(!response.data.contains_key("api_key"));
    assert_eq!(response.data["domain"], "example.com");
    let rendered = serde_json::to_string(&response.data).unwrap();
    assert!(!rendered.contains("apiKey123"));
}

#[tokio::test]
async fn test_default_ttls_are_zero() {
    let host = HostHarness::new();
    host.write_config(common::default_config()).await.unwrap();

    let response = host.read_config().await.unwrap().unwrap();

    assert_eq!(response.data["ttl"], 0);
    assert_eq!(response.data["max_ttl"], 0);
}

#[rstest]
#[case(json!("1h"), 3600)]
#[case(json!(600), 600)]
#[case(json!("90m"), 5400)]
#[tokio::test]
async fn test_set_ttl(#[case] ttl: Value, #[case] expected: u64) {
    let host = HostHarness::new();
    host.write_config(json!({"api_key": "apiKey123", "domain": "example.com", "ttl": ttl}))
        .await
        .unwrap();

    let response = host.read_config().await.unwrap().unwrap();

    assert_eq!(response.data["ttl"], expected);
}

#[tokio::test]
async fn test_partial_write_keeps_ttls() {
    let host = HostHarness::new();
    host.write_config(json!({
        "api_key": "apiKey123",
        "domain": "example.com",
        "ttl": "1h",
        "max_ttl": "6h",
    }))
    .await
    .unwrap();

    // WHEN: A later write omits both TTL fields
    host.write_config(json!({"api_key": "apiKey456", "domain": "mg.example.com"}))
        .await
        .unwrap();

    // THEN: The TTLs carry over
    let response = host.read_config().await.unwrap().unwrap();
    assert_eq!(
        Value::Object(response.data),
        json!({"domain": "mg.example.com", "ttl": 3600, "max_ttl": 21600})
    );
}

#[tokio::test]
async fn test_invalid_api_key_is_rejected() {
    let host = HostHarness::new();
    host.provider().set_api_key_valid(false);

    let response = host
        .write_config(common::default_config())
        .await
        .unwrap()
        .unwrap();

    assert_eq!(response.error_message(), Some("'api_key' is not valid"));
    assert!(host.read_config().await.unwrap().is_none());
}

#[tokio::test]
async fn test_invalid_domain_leaves_prior_config() {
    // GIVEN: A stored configuration
    let host = HostHarness::new();
    host.write_config(json!({"api_key": "apiKey123", "domain": "example.com", "ttl": "1h"}))
        .await
        .unwrap();

    // WHEN: A write names a domain the key cannot see
    host.provider().set_domain_valid(false);
    let response = host
        .write_config(json!({"api_key": "apiKey123", "domain": "elsewhere.com", "ttl": "2h"}))
        .await
        .unwrap()
        .unwrap();

    // THEN: The domain-specific error is returned and the old record stands
    assert_eq!(response.error_message(), Some("'domain' is not valid"));
    let current = host.read_config().await.unwrap().unwrap();
    assert_eq!(current.data["domain"], "example.com");
    assert_eq!(current.data["ttl"], 3600);
}

#[tokio::test]
async fn test_missing_domain_leaves_prior_config() {
    // GIVEN: A stored configuration
    let host = HostHarness::new();
    host.write_config(json!({"api_key": "apiKey123", "domain": "example.com", "ttl": "1h"}))
        .await
        .unwrap();

    // WHEN: A later write drops the domain
    let response = host
        .write_config(json!({"api_key": "apiKey456", "ttl": "2h"}))
        .await
        .unwrap()
        .unwrap();

    // THEN: The write is refused and the earlier record is what reads back
    assert!(response.error_message().unwrap().contains("domain"));
    let current = host.read_config().await.unwrap().unwrap();
    assert_eq!(
        Value::Object(current.data),
        json!({"domain": "example.com", "ttl": 3600, "max_ttl": 0})
    );
    assert_eq!(host.storage().put_count(), 1);
}

#[tokio::test]
async fn test_sub_second_ttl_is_rejected() {
    let host = HostHarness::new();

    let response = host
        .write_config(json!({"api_key": "apiKey123", "domain": "example.com", "ttl": "1500ms"}))
        .await
        .unwrap()
        .unwrap();

    // Fractional seconds are refused before any provider call
    assert!(response.error_message().unwrap().contains("ttl"));
    assert!(host.read_config().await.unwrap().is_none());
    assert_eq!(host.provider().validation_calls(), 0);
}

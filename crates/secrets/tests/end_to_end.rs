//! Full mount lifecycle as the host would drive it

mod common;

use std::time::Duration;

use mgsecret::Request;
use mgsecret::testing::HostHarness;
use pretty_assertions::assert_eq;
use serde_json::json;

#[tokio::test]
async fn test_configure_issue_renew_revoke() {
    common::init_tracing();
    let host = HostHarness::new();

    // GIVEN: An operator configures the mount
    let written = host
        .write_config(json!({
            "api_key": "key-1",
            "domain": "mg.example.com",
            "ttl": "1h",
            "max_ttl": "24h",
        }))
        .await
        .unwrap();
    assert!(written.is_none());

    // AND: Reading it back hides the key
    let config = host.read_config().await.unwrap().unwrap();
    assert_eq!(
        serde_json::Value::Object(config.data),
        json!({"domain": "mg.example.com", "ttl": 3600, "max_ttl": 86400})
    );

    // WHEN: A consumer reads credentials
    let issued = host.read_credentials().await.unwrap();
    let id = issued.lease_id.clone().unwrap();
    let username = issued.username().unwrap().to_string();
    assert!(host.provider().has_credential(&username));

    let lease = host.lease(&id).await.unwrap();
    assert_eq!(lease.ttl, Duration::from_secs(3600));
    assert_eq!(lease.max_ttl, Duration::from_secs(86400));

    // AND: The lease is renewed
    let renewed = host.renew(&id).await.unwrap().unwrap();
    assert!(!renewed.is_error());
    assert_eq!(renewed.secret.unwrap().username(), Some(username.as_str()));

    // AND: The lease is revoked
    let final_lease = host.lease(&id).await.unwrap();
    assert!(host.revoke(&id).await.unwrap().is_none());

    // THEN: The identity is gone upstream and the host forgot the lease
    assert!(!host.provider().has_credential(&username));
    assert!(host.lease(&id).await.is_none());

    // AND: Replaying the revoke is still a success
    let replay = host
        .backend()
        .handle_request(&Request::revoke(final_lease))
        .await
        .unwrap();
    assert!(replay.is_none());
    assert_eq!(host.provider().delete_calls(), 2);
}

#[tokio::test]
async fn test_reconfigure_between_issues() {
    let host = HostHarness::new();
    host.write_config(json!({"api_key": "key-1", "domain": "a.example.com"}))
        .await
        .unwrap();
    let first = host.read_credentials().await.unwrap();

    // WHEN: The mount is pointed at another domain
    host.write_config(json!({"api_key": "key-1", "domain": "b.example.com"}))
        .await
        .unwrap();
    let second = host.read_credentials().await.unwrap();

    // THEN: New credentials land on the new domain
    let provider = host.provider();
    assert!(
        provider
            .password_for("a.example.com", first.username().unwrap())
            .is_some()
    );
    assert!(
        provider
            .password_for("b.example.com", second.username().unwrap())
            .is_some()
    );
    assert_ne!(first.username(), second.username());
}

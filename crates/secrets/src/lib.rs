//! mgsecret - dynamic Mailgun SMTP credentials
//!
//! A secrets engine that turns one long-lived Mailgun API key into a supply
//! of short-lived SMTP logins, each tracked through a lease held by the host
//! runtime.
//!
//! # Features
//!
//! - **Validated configuration** - API key and domain are checked against
//!   Mailgun before they are stored; the key is never readable again
//! - **Dynamic credentials** - `vault.<suffix>` logins with 32-character
//!   random passwords from the OS CSPRNG
//! - **Lease callbacks** - renew re-reads the configured TTL window, revoke
//!   deletes upstream and is idempotent
//! - **Pluggable provider** - the live `reqwest` client sits behind the
//!   `mailgun-http` feature; tests swap in `testing::MockCredentialProvider`
//!   (feature `test-util`)
//!
//! # Example
//!
//! ```
//! # async fn example() -> mgsecret::core::Result<()> {
//! use serde_json::json;
//! use mgsecret::testing::HostHarness;
//!
//! let host = HostHarness::new();
//! host.write_config(json!({"api_key": "k1", "domain": "example.com", "ttl": "1h"}))
//!     .await?;
//!
//! let issued = host.read_credentials().await?;
//! assert!(issued.username().unwrap().starts_with("vault."));
//! host.revoke(&issued.lease_id.unwrap()).await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

/// Request surface the host runtime calls into
pub mod backend;
/// Singleton configuration record
pub mod config;
/// Core types and errors
pub mod core;
/// Lease model and the host lease registry capability
pub mod lease;
/// Credential issue, renew and revoke
pub mod lifecycle;
/// External account provider boundary
pub mod provider;
/// Host storage view
pub mod storage;
/// Test doubles, behind feature `test-util`
#[cfg(any(test, feature = "test-util"))]
pub mod testing;

pub use crate::backend::{Backend, Operation, Request, Response};
pub use crate::config::{ConfigStore, ConfigUpdate, ConfigView, Configuration};
pub use crate::core::{EngineError, ProviderError, SecretString, StorageError, ValidationError};
pub use crate::lease::{LeaseId, LeaseRegistry, MemoryLeaseRegistry, SecretLease};
pub use crate::lifecycle::{CredentialEngine, IssuedCredential};
pub use crate::provider::{AccountBinding, CredentialProvider};
pub use crate::storage::{MemoryStorage, Storage, StorageEntry};

/// Commonly used types and traits
pub mod prelude {
    pub use crate::backend::{Backend, Operation, Request, Response};
    pub use crate::config::{ConfigStore, ConfigUpdate};
    pub use crate::core::{EngineError, SecretString};
    pub use crate::lease::{LeaseRegistry, SecretLease};
    pub use crate::provider::{AccountBinding, CredentialProvider};
    pub use crate::storage::Storage;

    #[cfg(feature = "mailgun-http")]
    pub use crate::provider::{MailgunConfig, MailgunProvider};
}

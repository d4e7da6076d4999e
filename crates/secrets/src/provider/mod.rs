//! Credential provider adapter
//!
//! The boundary to the external account system that actually owns the SMTP
//! identities. A provider is built once per backend and receives the
//! [`AccountBinding`] to act for on every call, so configuration changes
//! never require rebuilding it.

pub mod config;
#[cfg(feature = "mailgun-http")]
pub mod mailgun;

pub use config::{ConfigError, ProviderConfig};
#[cfg(feature = "mailgun-http")]
pub use mailgun::{MailgunConfig, MailgunProvider};

use async_trait::async_trait;

use crate::core::{ProviderError, SecretString};

/// The account a provider call acts for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountBinding {
    /// Sending domain the SMTP credentials belong to
    pub domain: String,
    /// Account API key
    pub api_key: SecretString,
}

impl AccountBinding {
    /// Bind `domain` to `api_key`
    pub fn new(domain: impl Into<String>, api_key: SecretString) -> Self {
        Self {
            domain: domain.into(),
            api_key,
        }
    }
}

/// Contract every external account provider satisfies
///
/// # Contract
///
/// - `validate_*` answer a yes/no question and never fail; any transport
///   or authorization problem means "not valid".
/// - `delete_credential` is idempotent: deleting an identity that does not
///   exist returns `Ok(())`.
/// - No method retries internally.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// True if the API key authenticates
    async fn validate_api_key(&self, account: &AccountBinding) -> bool;

    /// True if the domain is visible under the API key
    async fn validate_domain(&self, account: &AccountBinding) -> bool;

    /// Register a new SMTP identity
    async fn create_credential(
        &self,
        account: &AccountBinding,
        login: &str,
        password: &SecretString,
    ) -> Result<(), ProviderError>;

    /// Remove an SMTP identity
    async fn delete_credential(
        &self,
        account: &AccountBinding,
        login: &str,
    ) -> Result<(), ProviderError>;

    /// Provider name for logging
    fn provider_name(&self) -> &'static str;
}

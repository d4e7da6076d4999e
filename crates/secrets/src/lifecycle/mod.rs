//! Credential lifecycle: issue, renew, revoke
//!
//! ```text
//!  Requested ──issue──▶ Issued ──renew──▶ Issued ──revoke──▶ Revoked
//!                          ▲                 │
//!                          └─────renew───────┘
//! ```
//!
//! Every call reloads the configuration; nothing about an issued credential
//! is kept here between calls. The lease's internal data carries the
//! upstream login from issue to renew/revoke.

pub mod generator;

use std::sync::Arc;
use std::time::Duration;

use crate::config::ConfigStore;
use crate::core::{EngineError, Result, SecretString};
use crate::lease::{INTERNAL_USER_NAME, SecretLease};
use crate::provider::CredentialProvider;

/// A credential registered upstream, ready to hand to the caller
#[derive(Debug, Clone)]
pub struct IssuedCredential {
    /// Upstream SMTP login
    pub username: String,
    /// SMTP password
    pub password: SecretString,
    /// Lease the host should track
    pub lease: SecretLease,
}

impl IssuedCredential {
    /// Lease lifetime copied from configuration at issue time
    pub fn ttl(&self) -> Duration {
        self.lease.ttl
    }

    /// Renewal ceiling copied from configuration at issue time
    pub fn max_ttl(&self) -> Duration {
        self.lease.max_ttl
    }
}

/// Issues and retires SMTP credentials for the configured account
#[derive(Clone)]
pub struct CredentialEngine {
    config: ConfigStore,
    provider: Arc<dyn CredentialProvider>,
}

impl CredentialEngine {
    /// Engine reading configuration from `config` and acting through `provider`
    pub fn new(config: ConfigStore, provider: Arc<dyn CredentialProvider>) -> Self {
        Self { config, provider }
    }

    /// Generate a new identity, register it upstream and return it with a lease
    #[tracing::instrument(skip(self))]
    pub async fn issue(&self) -> Result<IssuedCredential> {
        let config = self.config.require().await?;
        let generated = generator::generate()?;

        self.provider
            .create_credential(&config.account(), &generated.username, &generated.password)
            .await
            .map_err(|e| {
                tracing::warn!(username = %generated.username, error = %e, "Provider refused credential");
                EngineError::provider("create", e)
            })?;

        tracing::info!(
            username = %generated.username,
            domain = %config.domain,
            ttl = config.ttl.as_secs(),
            max_ttl = config.max_ttl.as_secs(),
            "Issued SMTP credential"
        );

        let lease = SecretLease::smtp(&generated.username, config.ttl, config.max_ttl);
        Ok(IssuedCredential {
            username: generated.username,
            password: generated.password,
            lease,
        })
    }

    /// Extend a lease with the configuration's current TTL window
    ///
    /// The provider is not contacted; the identity already exists upstream.
    #[tracing::instrument(skip(self, lease), fields(username = lease.username().unwrap_or("")))]
    pub async fn renew(&self, lease: &SecretLease) -> Result<SecretLease> {
        let config = self.config.require().await?;

        let mut renewed = lease.clone();
        renewed.ttl = config.ttl;
        renewed.max_ttl = config.max_ttl;

        tracing::info!(
            ttl = config.ttl.as_secs(),
            max_ttl = config.max_ttl.as_secs(),
            "Renewed SMTP credential"
        );
        Ok(renewed)
    }

    /// Delete the lease's identity upstream
    ///
    /// Fails with [`EngineError::NotConfigured`] when the configuration is
    /// gone, because the identity cannot be removed without it. An identity
    /// that is already absent upstream counts as revoked.
    #[tracing::instrument(skip(self, lease))]
    pub async fn revoke(&self, lease: &SecretLease) -> Result<()> {
        let username = lease
            .username()
            .ok_or(EngineError::MissingInternalState {
                key: INTERNAL_USER_NAME,
            })?;

        let config = self.config.require().await.inspect_err(|e| {
            if matches!(e, EngineError::NotConfigured) {
                tracing::error!(username, "Cannot revoke credential: backend is not configured");
            }
        })?;

        self.provider
            .delete_credential(&config.account(), username)
            .await
            .map_err(|e| {
                tracing::warn!(username, error = %e, "Provider failed to delete credential");
                EngineError::provider("delete", e)
            })?;

        tracing::info!(username, domain = %config.domain, "Revoked SMTP credential");
        Ok(())
    }
}

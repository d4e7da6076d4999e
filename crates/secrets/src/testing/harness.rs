use std::sync::Arc;

use serde_json::Value;

use super::MockCredentialProvider;
use crate::backend::{Backend, PATH_CONFIG, PATH_CREDENTIALS, Request, Response};
use crate::core::Result;
use crate::lease::{LeaseId, LeaseRegistry, MemoryLeaseRegistry, SecretLease};
use crate::storage::MemoryStorage;

/// Response to a credentials read, with the lease the host registered for it
#[derive(Debug, Clone)]
pub struct IssuedLease {
    /// What the backend returned
    pub response: Response,
    /// Registry entry, present when the backend issued a lease
    pub lease_id: Option<LeaseId>,
}

impl IssuedLease {
    /// Issued username
    pub fn username(&self) -> Option<&str> {
        self.response.data.get("username").and_then(Value::as_str)
    }

    /// Issued password
    pub fn password(&self) -> Option<&str> {
        self.response.data.get("password").and_then(Value::as_str)
    }
}

/// Minimal host runtime around one mounted [`Backend`]
///
/// Registers leases on issue, replaces them on renew and drops them only
/// after a successful revoke, so a failed revoke can be retried.
pub struct HostHarness {
    backend: Backend,
    storage: MemoryStorage,
    provider: Arc<MockCredentialProvider>,
    leases: MemoryLeaseRegistry,
}

impl HostHarness {
    /// Host with fresh storage and a permissive mock provider
    pub fn new() -> Self {
        let storage = MemoryStorage::new();
        let provider = Arc::new(MockCredentialProvider::new());
        let backend = Backend::new(Arc::new(storage.clone()), provider.clone());
        Self {
            backend,
            storage,
            provider,
            leases: MemoryLeaseRegistry::new(),
        }
    }

    /// The mounted backend
    pub fn backend(&self) -> &Backend {
        &self.backend
    }

    /// The mount's storage view
    pub fn storage(&self) -> &MemoryStorage {
        &self.storage
    }

    /// The provider double
    pub fn provider(&self) -> &MockCredentialProvider {
        &self.provider
    }

    /// The lease registry
    pub fn leases(&self) -> &MemoryLeaseRegistry {
        &self.leases
    }

    /// `POST config` with a JSON object body
    pub async fn write_config(&self, body: Value) -> Result<Option<Response>> {
        let data = match body {
            Value::Object(map) => map,
            _ => serde_json::Map::new(),
        };
        self.backend
            .handle_request(&Request::update(PATH_CONFIG, data))
            .await
    }

    /// `GET config`
    pub async fn read_config(&self) -> Result<Option<Response>> {
        self.backend.handle_request(&Request::read(PATH_CONFIG)).await
    }

    /// `GET credentials`, registering the returned lease
    pub async fn read_credentials(&self) -> Result<IssuedLease> {
        let response = self
            .backend
            .handle_request(&Request::read(PATH_CREDENTIALS))
            .await?
            .unwrap_or_default();

        let lease_id = match &response.secret {
            Some(lease) if !response.is_error() => Some(self.leases.attach(lease.clone()).await),
            _ => None,
        };
        Ok(IssuedLease { response, lease_id })
    }

    /// Current state of a lease
    pub async fn lease(&self, id: &LeaseId) -> Option<SecretLease> {
        self.leases.lookup(id).await
    }

    /// Run the renew callback for `id` and store the renewed lease
    pub async fn renew(&self, id: &LeaseId) -> Result<Option<Response>> {
        let Some(lease) = self.leases.lookup(id).await else {
            return Ok(Some(Response::error(format!("lease '{id}' not found"))));
        };

        let response = self.backend.handle_request(&Request::renew(lease)).await?;
        if let Some(renewed) = response
            .as_ref()
            .filter(|r| !r.is_error())
            .and_then(|r| r.secret.clone())
        {
            self.leases.update(id, renewed).await;
        }
        Ok(response)
    }

    /// Run the revoke callback for `id`; the lease is dropped only on success
    pub async fn revoke(&self, id: &LeaseId) -> Result<Option<Response>> {
        let Some(lease) = self.leases.lookup(id).await else {
            return Ok(Some(Response::error(format!("lease '{id}' not found"))));
        };

        let response = self.backend.handle_request(&Request::revoke(lease)).await?;
        if !response.as_ref().is_some_and(Response::is_error) {
            self.leases.release(id).await;
        }
        Ok(response)
    }
}

impl Default for HostHarness {
    fn default() -> Self {
        Self::new()
    }
}

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::Mutex;

use crate::core::{ProviderError, SecretString};
use crate::provider::{AccountBinding, CredentialProvider};

/// Mock provider with configurable behavior
///
/// Keeps the identities it "created" per domain, so tests can check what
/// would still be live upstream. Clones share state.
#[derive(Clone)]
pub struct MockCredentialProvider {
    credentials: Arc<DashMap<(String, String), SecretString>>,
    api_key_valid: Arc<AtomicBool>,
    domain_valid: Arc<AtomicBool>,
    next_create_error: Arc<Mutex<Option<ProviderError>>>,
    next_delete_error: Arc<Mutex<Option<ProviderError>>>,
    validation_count: Arc<AtomicU32>,
    create_count: Arc<AtomicU32>,
    delete_count: Arc<AtomicU32>,
}

impl MockCredentialProvider {
    /// Provider that accepts every account and call
    pub fn new() -> Self {
        Self {
            credentials: Arc::new(DashMap::new()),
            api_key_valid: Arc::new(AtomicBool::new(true)),
            domain_valid: Arc::new(AtomicBool::new(true)),
            next_create_error: Arc::new(Mutex::new(None)),
            next_delete_error: Arc::new(Mutex::new(None)),
            validation_count: Arc::new(AtomicU32::new(0)),
            create_count: Arc::new(AtomicU32::new(0)),
            delete_count: Arc::new(AtomicU32::new(0)),
        }
    }

    /// Answer for `validate_api_key`
    pub fn set_api_key_valid(&self, valid: bool) {
        self.api_key_valid.store(valid, Ordering::SeqCst);
    }

    /// Answer for `validate_domain`
    pub fn set_domain_valid(&self, valid: bool) {
        self.domain_valid.store(valid, Ordering::SeqCst);
    }

    /// Make the next create fail with `error`
    pub fn fail_next_create(&self, error: ProviderError) {
        *self.next_create_error.lock() = Some(error);
    }

    /// Make the next delete fail with `error`
    pub fn fail_next_delete(&self, error: ProviderError) {
        *self.next_delete_error.lock() = Some(error);
    }

    /// Number of `validate_*` calls
    pub fn validation_calls(&self) -> u32 {
        self.validation_count.load(Ordering::SeqCst)
    }

    /// Number of create attempts
    pub fn create_calls(&self) -> u32 {
        self.create_count.load(Ordering::SeqCst)
    }

    /// Number of delete attempts
    pub fn delete_calls(&self) -> u32 {
        self.delete_count.load(Ordering::SeqCst)
    }

    /// Identities currently registered, across domains
    pub fn live_credentials(&self) -> usize {
        self.credentials.len()
    }

    /// Whether `login` is registered on any domain
    pub fn has_credential(&self, login: &str) -> bool {
        self.credentials.iter().any(|entry| entry.key().1 == login)
    }

    /// Password registered for `login` on `domain`
    pub fn password_for(&self, domain: &str, login: &str) -> Option<SecretString> {
        self.credentials
            .get(&(domain.to_string(), login.to_string()))
            .map(|entry| entry.value().clone())
    }
}

impl Default for MockCredentialProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CredentialProvider for MockCredentialProvider {
    async fn validate_api_key(&self, _account: &AccountBinding) -> bool {
        self.validation_count.fetch_add(1, Ordering::SeqCst);
        self.api_key_valid.load(Ordering::SeqCst)
    }

    async fn validate_domain(&self, _account: &AccountBinding) -> bool {
        self.validation_count.fetch_add(1, Ordering::SeqCst);
        self.domain_valid.load(Ordering::SeqCst)
    }

    async fn create_credential(
        &self,
        account: &AccountBinding,
        login: &str,
        password: &SecretString,
    ) -> Result<(), ProviderError> {
        self.create_count.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = self.next_create_error.lock().take() {
            return Err(error);
        }

        let key = (account.domain.clone(), login.to_string());
        if self.credentials.contains_key(&key) {
            return Err(ProviderError::Rejected {
                status: 400,
                message: format!("login '{login}' already exists"),
            });
        }
        self.credentials.insert(key, password.clone());
        Ok(())
    }

    async fn delete_credential(
        &self,
        account: &AccountBinding,
        login: &str,
    ) -> Result<(), ProviderError> {
        self.delete_count.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = self.next_delete_error.lock().take() {
            return Err(error);
        }

        self.credentials
            .remove(&(account.domain.clone(), login.to_string()));
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "Mock"
    }
}

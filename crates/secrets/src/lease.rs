//! Leases attached to issued credentials
//!
//! The host runtime owns lease bookkeeping. This module gives the engine a
//! typed view of what the host stores ([`SecretLease`]) and the capability
//! interface the host provides for it ([`LeaseRegistry`]).

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Secret type tag for SMTP credentials issued by this engine
pub const SECRET_TYPE_SMTP_CREDENTIALS: &str = "smtp_credential_key";

/// Lease internal-data key that holds the upstream login
pub const INTERNAL_USER_NAME: &str = "user_name";

/// Lease as stored by the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecretLease {
    /// Secret type the lease belongs to
    pub secret_type: String,

    /// Current validity window; zero means host default
    #[serde(with = "humantime_serde")]
    pub ttl: Duration,

    /// Ceiling for cumulative renewal; zero means host default
    #[serde(with = "humantime_serde")]
    pub max_ttl: Duration,

    /// Whether the host may call renew
    pub renewable: bool,

    /// When the credential was issued
    pub issued_at: DateTime<Utc>,

    /// Opaque engine data; never shown to the credential's consumer
    #[serde(default)]
    pub internal_data: Map<String, Value>,
}

impl SecretLease {
    /// New renewable lease for an SMTP credential held by `username`
    pub fn smtp(username: &str, ttl: Duration, max_ttl: Duration) -> Self {
        let mut internal_data = Map::new();
        internal_data.insert(INTERNAL_USER_NAME.into(), Value::String(username.into()));
        Self {
            secret_type: SECRET_TYPE_SMTP_CREDENTIALS.into(),
            ttl,
            max_ttl,
            renewable: true,
            issued_at: Utc::now(),
            internal_data,
        }
    }

    /// The upstream login recorded at issue time
    pub fn username(&self) -> Option<&str> {
        self.internal_data
            .get(INTERNAL_USER_NAME)
            .and_then(Value::as_str)
    }

    /// Expiry of a window of `ttl` starting at `now`, clamped to
    /// `issued_at + max_ttl` when a ceiling is set.
    ///
    /// Returns `None` when `ttl` is zero (the host default applies).
    pub fn expires_at(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        if self.ttl.is_zero() {
            return None;
        }
        let window = chrono::Duration::from_std(self.ttl).ok()?;
        let expiry = now.checked_add_signed(window)?;
        if self.max_ttl.is_zero() {
            return Some(expiry);
        }
        let ceiling = chrono::Duration::from_std(self.max_ttl)
            .ok()
            .and_then(|max| self.issued_at.checked_add_signed(max));
        Some(ceiling.map_or(expiry, |ceiling| expiry.min(ceiling)))
    }
}

/// Host-assigned lease identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LeaseId(Uuid);

impl LeaseId {
    /// Fresh random identifier
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for LeaseId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for LeaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "mailgun/credentials/{}", self.0)
    }
}

/// Lease bookkeeping capability provided by the host
#[async_trait]
pub trait LeaseRegistry: Send + Sync {
    /// Record a new lease and return its identifier
    async fn attach(&self, lease: SecretLease) -> LeaseId;

    /// Current state of a lease
    async fn lookup(&self, id: &LeaseId) -> Option<SecretLease>;

    /// Replace a lease after renewal; returns false if the lease is unknown
    async fn update(&self, id: &LeaseId, lease: SecretLease) -> bool;

    /// Drop a lease once its credential is revoked
    async fn release(&self, id: &LeaseId) -> Option<SecretLease>;
}

/// In-memory [`LeaseRegistry`]
#[derive(Clone, Default)]
pub struct MemoryLeaseRegistry {
    leases: Arc<DashMap<LeaseId, SecretLease>>,
}

impl MemoryLeaseRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live leases
    pub fn len(&self) -> usize {
        self.leases.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.leases.is_empty()
    }
}

#[async_trait]
impl LeaseRegistry for MemoryLeaseRegistry {
    async fn attach(&self, lease: SecretLease) -> LeaseId {
        let id = LeaseId::new();
        self.leases.insert(id, lease);
        id
    }

    async fn lookup(&self, id: &LeaseId) -> Option<SecretLease> {
        self.leases.get(id).map(|entry| entry.value().clone())
    }

    async fn update(&self, id: &LeaseId, lease: SecretLease) -> bool {
        match self.leases.get_mut(id) {
            Some(mut entry) => {
                *entry = lease;
                true
            }
            None => false,
        }
    }

    async fn release(&self, id: &LeaseId) -> Option<SecretLease> {
        self.leases.remove(id).map(|(_, lease)| lease)
    }
}

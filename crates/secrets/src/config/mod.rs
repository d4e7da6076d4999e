//! Configuration store
//!
//! Exactly one [`Configuration`] record exists per mounted instance, kept
//! under the storage key [`CONFIG_KEY`]. A write is accepted only after the
//! provider confirms that the API key authenticates and that the domain is
//! visible under it; nothing is persisted otherwise.
//!
//! ```
//! # async fn example() -> mgsecret::core::Result<()> {
//! use std::sync::Arc;
//! use std::time::Duration;
//! use mgsecret::config::{ConfigStore, ConfigUpdate};
//! use mgsecret::storage::MemoryStorage;
//! use mgsecret::testing::MockCredentialProvider;
//!
//! let store = ConfigStore::new(
//!     Arc::new(MemoryStorage::new()),
//!     Arc::new(MockCredentialProvider::new()),
//! );
//! store
//!     .write(ConfigUpdate::new("key-123", "mg.example.com").with_ttl(Duration::from_secs(3600)))
//!     .await?;
//!
//! let view = store.read().await?.expect("written above");
//! assert_eq!(view.domain, "mg.example.com");
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::core::{
    EngineError, Result, SecretString, ValidationError, parse_duration_field, secret_string,
};
use crate::provider::{AccountBinding, CredentialProvider};
use crate::storage::{Storage, StorageEntry};

/// Storage key of the singleton configuration record
pub const CONFIG_KEY: &str = "config";

/// The mount's configuration record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Configuration {
    /// Mailgun API key, write-only
    #[serde(with = "secret_string::exposed")]
    pub api_key: SecretString,

    /// Sending domain the credentials are scoped to
    pub domain: String,

    /// Default lease lifetime; zero means host default
    #[serde(with = "humantime_serde")]
    pub ttl: Duration,

    /// Renewal ceiling; zero means host default
    #[serde(with = "humantime_serde")]
    pub max_ttl: Duration,
}

impl Configuration {
    /// Account the provider acts for
    pub fn account(&self) -> AccountBinding {
        AccountBinding::new(self.domain.clone(), self.api_key.clone())
    }

    /// Public projection without secret fields
    pub fn view(&self) -> ConfigView {
        ConfigView {
            domain: self.domain.clone(),
            ttl: self.ttl,
            max_ttl: self.max_ttl,
        }
    }
}

fn as_seconds<S: Serializer>(value: &Duration, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_u64(value.as_secs())
}

/// What a read of the configuration returns
///
/// There is no `api_key` field, so no serialization of this type can
/// include it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigView {
    /// Sending domain
    pub domain: String,
    /// Default lease lifetime, serialized as seconds
    #[serde(serialize_with = "as_seconds")]
    pub ttl: Duration,
    /// Renewal ceiling, serialized as seconds
    #[serde(serialize_with = "as_seconds")]
    pub max_ttl: Duration,
}

impl ConfigView {
    /// Response fields, with both TTLs in whole seconds
    pub fn to_fields(&self) -> Map<String, Value> {
        let mut fields = Map::new();
        fields.insert("domain".into(), Value::String(self.domain.clone()));
        fields.insert("ttl".into(), Value::from(self.ttl.as_secs()));
        fields.insert("max_ttl".into(), Value::from(self.max_ttl.as_secs()));
        fields
    }
}

/// A configuration write request
///
/// `api_key` and `domain` are required on every write; `None` TTL fields
/// keep whatever the stored record has.
#[derive(Debug, Clone, Default)]
pub struct ConfigUpdate {
    /// API key
    pub api_key: Option<SecretString>,
    /// Sending domain
    pub domain: Option<String>,
    /// New default lease lifetime
    pub ttl: Option<Duration>,
    /// New renewal ceiling
    pub max_ttl: Option<Duration>,
}

impl ConfigUpdate {
    /// Update carrying both required fields
    pub fn new(api_key: impl Into<String>, domain: impl Into<String>) -> Self {
        Self {
            api_key: Some(SecretString::new(api_key)),
            domain: Some(domain.into()),
            ttl: None,
            max_ttl: None,
        }
    }

    /// Set the default lease lifetime
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// Set the renewal ceiling
    pub fn with_max_ttl(mut self, max_ttl: Duration) -> Self {
        self.max_ttl = Some(max_ttl);
        self
    }

    /// Decode raw request fields
    ///
    /// Missing fields stay `None` here; [`ConfigStore::write`] decides which
    /// are required. Present fields of the wrong shape are rejected.
    pub fn from_fields(data: &Map<String, Value>) -> std::result::Result<Self, ValidationError> {
        Ok(Self {
            api_key: string_field(data, "api_key")?.map(SecretString::new),
            domain: string_field(data, "domain")?,
            ttl: data
                .get("ttl")
                .map(|raw| parse_duration_field("ttl", raw))
                .transpose()?,
            max_ttl: data
                .get("max_ttl")
                .map(|raw| parse_duration_field("max_ttl", raw))
                .transpose()?,
        })
    }
}

fn string_field(
    data: &Map<String, Value>,
    field: &'static str,
) -> std::result::Result<Option<String>, ValidationError> {
    match data.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(ValidationError::InvalidField {
            field,
            reason: format!("expected a string, got {other}"),
        }),
    }
}

fn required<T>(value: Option<T>, field: &'static str, is_empty: impl Fn(&T) -> bool) -> Result<T> {
    match value {
        Some(v) if !is_empty(&v) => Ok(v),
        _ => Err(ValidationError::MissingField { field }.into()),
    }
}

/// Owner of the singleton configuration record
#[derive(Clone)]
pub struct ConfigStore {
    storage: Arc<dyn Storage>,
    provider: Arc<dyn CredentialProvider>,
}

impl ConfigStore {
    /// Store over `storage`, validating writes through `provider`
    pub fn new(storage: Arc<dyn Storage>, provider: Arc<dyn CredentialProvider>) -> Self {
        Self { storage, provider }
    }

    /// Full record, for the engine's own use
    pub async fn load(&self) -> Result<Option<Configuration>> {
        match self.storage.get(CONFIG_KEY).await? {
            Some(entry) => Ok(Some(entry.decode_json()?)),
            None => Ok(None),
        }
    }

    /// Full record, or [`EngineError::NotConfigured`]
    pub async fn require(&self) -> Result<Configuration> {
        self.load().await?.ok_or(EngineError::NotConfigured)
    }

    /// Current configuration without secret fields; `None` if never written
    pub async fn read(&self) -> Result<Option<ConfigView>> {
        Ok(self.load().await?.map(|config| config.view()))
    }

    /// Validate `update` against the provider and persist it
    #[tracing::instrument(skip(self, update), fields(provider = self.provider.provider_name()))]
    pub async fn write(&self, update: ConfigUpdate) -> Result<()> {
        let api_key = required(update.api_key, "api_key", SecretString::is_empty)?;
        let domain = required(update.domain, "domain", String::is_empty)?;

        let mut config = match self.load().await? {
            Some(existing) => existing,
            None => Configuration {
                api_key: api_key.clone(),
                domain: domain.clone(),
                ttl: Duration::ZERO,
                max_ttl: Duration::ZERO,
            },
        };
        config.api_key = api_key;
        config.domain = domain;
        if let Some(ttl) = update.ttl {
            config.ttl = ttl;
        }
        if let Some(max_ttl) = update.max_ttl {
            config.max_ttl = max_ttl;
        }

        let account = config.account();
        if !self.provider.validate_api_key(&account).await {
            tracing::warn!(domain = %config.domain, "Rejected configuration: api_key does not authenticate");
            return Err(ValidationError::InvalidApiKey.into());
        }
        if !self.provider.validate_domain(&account).await {
            tracing::warn!(domain = %config.domain, "Rejected configuration: domain not visible under api_key");
            return Err(ValidationError::InvalidDomain.into());
        }

        self.storage
            .put(StorageEntry::json(CONFIG_KEY, &config)?)
            .await?;
        tracing::info!(
            domain = %config.domain,
            ttl = config.ttl.as_secs(),
            max_ttl = config.max_ttl.as_secs(),
            "Stored Mailgun configuration"
        );
        Ok(())
    }
}

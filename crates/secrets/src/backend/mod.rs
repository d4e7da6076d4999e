//! Request surface exposed to the host runtime
//!
//! The host routes HTTP-shaped requests to [`Backend::handle_request`]:
//!
//! | operation | path          | effect                                    |
//! |-----------|---------------|-------------------------------------------|
//! | `Read`    | `config`      | configuration without `api_key`, or none  |
//! | `Update`  | `config`      | validate and store configuration          |
//! | `Read`    | `credentials` | new `{username, password}` with a lease   |
//! | `Renew`   | (lease)       | lease with the current TTL window         |
//! | `Revoke`  | (lease)       | delete the identity upstream              |
//!
//! User-facing failures come back as error responses. Storage and entropy
//! failures are returned as `Err` for the host to log and report as
//! internal errors.

mod help;
mod request;

pub use request::{Operation, Request, Response};

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::config::{ConfigStore, ConfigUpdate};
use crate::core::{EngineError, Result};
use crate::lease::SECRET_TYPE_SMTP_CREDENTIALS;
use crate::lifecycle::CredentialEngine;
use crate::provider::CredentialProvider;
use crate::storage::Storage;

/// Path serving the configuration record
pub const PATH_CONFIG: &str = "config";
/// Path issuing credentials
pub const PATH_CREDENTIALS: &str = "credentials";

/// One mounted instance of the Mailgun secrets engine
#[derive(Clone)]
pub struct Backend {
    config: ConfigStore,
    engine: CredentialEngine,
}

impl Backend {
    /// Mount over the host's storage view with one provider for its lifetime
    pub fn new(storage: Arc<dyn Storage>, provider: Arc<dyn CredentialProvider>) -> Self {
        let config = ConfigStore::new(storage, Arc::clone(&provider));
        let engine = CredentialEngine::new(config.clone(), provider);
        Self { config, engine }
    }

    /// The configuration store
    pub fn config_store(&self) -> &ConfigStore {
        &self.config
    }

    /// The lifecycle engine
    pub fn engine(&self) -> &CredentialEngine {
        &self.engine
    }

    /// Backend-level help text
    pub fn help() -> &'static str {
        help::BACKEND_HELP.trim()
    }

    /// Synopsis and description for a path, if it exists
    pub fn path_help(path: &str) -> Option<(&'static str, &'static str)> {
        match path {
            PATH_CONFIG => Some((help::CONFIG_SYNOPSIS, help::CONFIG_DESCRIPTION)),
            PATH_CREDENTIALS => Some((help::CREDENTIALS_SYNOPSIS, help::CREDENTIALS_DESCRIPTION)),
            _ => None,
        }
    }

    /// Storage keys the host should seal-wrap
    pub fn seal_wrap_paths() -> &'static [&'static str] {
        &[PATH_CONFIG]
    }

    /// Dispatch one host request
    #[tracing::instrument(skip(self, request), fields(operation = %request.operation, path = %request.path))]
    pub async fn handle_request(&self, request: &Request) -> Result<Option<Response>> {
        let outcome = match (request.operation, request.path.as_str()) {
            (Operation::Read, PATH_CONFIG) => self.read_config().await,
            (Operation::Update, PATH_CONFIG) => self.write_config(&request.data).await,
            (Operation::Read, PATH_CREDENTIALS) => self.read_credentials().await,
            (Operation::Renew | Operation::Revoke, _) => self.handle_lease(request).await,
            _ => Err(EngineError::UnsupportedOperation {
                operation: request.operation.to_string(),
                path: request.path.clone(),
            }),
        };

        match outcome {
            Err(e) if e.is_user_facing() => {
                tracing::debug!(error = %e, "Returning error response");
                Ok(Some(Response::error(e.to_string())))
            }
            other => other,
        }
    }

    async fn read_config(&self) -> Result<Option<Response>> {
        let Some(view) = self.config.read().await? else {
            return Ok(None);
        };
        Ok(Some(Response::data(view.to_fields())))
    }

    async fn write_config(&self, data: &Map<String, Value>) -> Result<Option<Response>> {
        let update = ConfigUpdate::from_fields(data)?;
        self.config.write(update).await?;
        Ok(None)
    }

    async fn read_credentials(&self) -> Result<Option<Response>> {
        let issued = self.engine.issue().await?;

        let mut data = Map::new();
        data.insert("username".into(), Value::String(issued.username.clone()));
        data.insert(
            "password".into(),
            issued
                .password
                .expose_secret(|pw| Value::String(pw.to_owned())),
        );
        Ok(Some(Response::data(data).with_secret(issued.lease)))
    }

    async fn handle_lease(&self, request: &Request) -> Result<Option<Response>> {
        let unsupported = || EngineError::UnsupportedOperation {
            operation: request.operation.to_string(),
            path: request.path.clone(),
        };
        let lease = request.secret.as_ref().ok_or_else(unsupported)?;
        if lease.secret_type != SECRET_TYPE_SMTP_CREDENTIALS {
            return Err(unsupported());
        }

        if request.operation == Operation::Renew {
            let renewed = self.engine.renew(lease).await?;
            Ok(Some(Response::default().with_secret(renewed)))
        } else {
            self.engine.revoke(lease).await?;
            Ok(None)
        }
    }
}

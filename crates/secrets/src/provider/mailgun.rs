//! Mailgun provider over the v3 REST API.
//!
//! Every call authenticates with HTTP basic auth (`api:<key>`) against the
//! account in the [`AccountBinding`]:
//!
//! | operation           | request                                            |
//! |---------------------|----------------------------------------------------|
//! | `validate_api_key`  | `GET /v3/domains?limit=1&skip=0`                   |
//! | `validate_domain`   | `GET /v3/domains/{domain}/credentials?limit=1&skip=0` |
//! | `create_credential` | `POST /v3/domains/{domain}/credentials` (form)     |
//! | `delete_credential` | `DELETE /v3/domains/{domain}/credentials/{login}`  |
//!
//! # Example
//!
//! ```rust,no_run
//! use mgsecret::provider::{MailgunConfig, MailgunProvider};
//! use std::time::Duration;
//!
//! let provider = MailgunProvider::new(MailgunConfig {
//!     base_url: "https://api.eu.mailgun.net".into(),
//!     timeout: Duration::from_secs(5),
//! })?;
//! # Ok::<(), mgsecret::provider::ConfigError>(())
//! ```

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use url::Url;

use super::config::{ConfigError, ProviderConfig};
use super::{AccountBinding, CredentialProvider};
use crate::core::{ProviderError, SecretString};

const PROBE_QUERY: &str = "limit=1&skip=0";

/// Transport configuration for [`MailgunProvider`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MailgunConfig {
    /// API root, `https://api.mailgun.net` or the EU endpoint
    pub base_url: String,

    /// Per-request timeout (1-60 seconds)
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
}

impl Default for MailgunConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.mailgun.net".into(),
            timeout: Duration::from_secs(10),
        }
    }
}

impl ProviderConfig for MailgunConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.base_url.is_empty() {
            return Err(ConfigError::MissingRequired {
                field: "base_url".into(),
            });
        }

        let url = Url::parse(&self.base_url).map_err(|e| ConfigError::InvalidValue {
            field: "base_url".into(),
            reason: e.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidValue {
                field: "base_url".into(),
                reason: "Must start with http:// or https://".into(),
            });
        }
        if url.cannot_be_a_base() {
            return Err(ConfigError::InvalidValue {
                field: "base_url".into(),
                reason: "Must be a hierarchical URL".into(),
            });
        }

        let timeout_secs = self.timeout.as_secs();
        if !(1..=60).contains(&timeout_secs) {
            return Err(ConfigError::InvalidValue {
                field: "timeout".into(),
                reason: format!("must be between 1 and 60 seconds, got {timeout_secs} seconds"),
            });
        }

        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "Mailgun"
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// Live Mailgun credential provider
#[derive(Debug, Clone)]
pub struct MailgunProvider {
    client: Client,
    base_url: Url,
}

impl MailgunProvider {
    /// Build a provider from validated configuration
    pub fn new(config: MailgunConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let base_url = Url::parse(&config.base_url).map_err(|e| ConfigError::InvalidValue {
            field: "base_url".into(),
            reason: e.to_string(),
        })?;
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ConfigError::InvalidValue {
                field: "timeout".into(),
                reason: format!("failed to build HTTP client: {e}"),
            })?;

        tracing::info!(
            provider = config.provider_name(),
            base_url = %base_url,
            timeout = ?config.timeout,
            "Initialized provider"
        );

        Ok(Self { client, base_url })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ProviderError> {
        let mut url = self.base_url.clone();
        {
            let mut path = url.path_segments_mut().map_err(|()| {
                ProviderError::Unavailable(format!("'{}' cannot be a base URL", self.base_url))
            })?;
            path.pop_if_empty().push("v3").extend(segments);
        }
        Ok(url)
    }

    fn probe_endpoint(&self, segments: &[&str]) -> Result<Url, ProviderError> {
        let mut url = self.endpoint(segments)?;
        url.set_query(Some(PROBE_QUERY));
        Ok(url)
    }

    fn authorized(request: RequestBuilder, account: &AccountBinding) -> RequestBuilder {
        account
            .api_key
            .expose_secret(|key| request.basic_auth("api", Some(key)))
    }

    async fn send(request: RequestBuilder) -> Result<Response, ProviderError> {
        request
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))
    }

    async fn rejection(response: Response) -> ProviderError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .map(|b| b.message)
            .unwrap_or_else(|_| {
                if body.is_empty() {
                    status.canonical_reason().unwrap_or("no message").to_string()
                } else {
                    body
                }
            });
        ProviderError::Rejected {
            status: status.as_u16(),
            message,
        }
    }

    async fn probe(&self, account: &AccountBinding, url: Result<Url, ProviderError>) -> bool {
        let url = match url {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!(error = %e, "Mailgun probe URL could not be built");
                return false;
            }
        };
        let request = Self::authorized(self.client.get(url), account);
        match Self::send(request).await {
            Ok(response) if response.status().is_success() => true,
            Ok(response) => {
                tracing::warn!(status = %response.status(), "Mailgun probe rejected");
                false
            }
            Err(e) => {
                tracing::warn!(error = %e, "Mailgun probe failed");
                false
            }
        }
    }
}

#[async_trait]
impl CredentialProvider for MailgunProvider {
    #[tracing::instrument(skip(self, account), fields(provider = "Mailgun"))]
    async fn validate_api_key(&self, account: &AccountBinding) -> bool {
        self.probe(account, self.probe_endpoint(&["domains"])).await
    }

    #[tracing::instrument(skip(self, account), fields(provider = "Mailgun", domain = %account.domain))]
    async fn validate_domain(&self, account: &AccountBinding) -> bool {
        self.probe(
            account,
            self.probe_endpoint(&["domains", &account.domain, "credentials"]),
        )
        .await
    }

    #[tracing::instrument(skip(self, account, password), fields(provider = "Mailgun", domain = %account.domain))]
    async fn create_credential(
        &self,
        account: &AccountBinding,
        login: &str,
        password: &SecretString,
    ) -> Result<(), ProviderError> {
        let url = self.endpoint(&["domains", &account.domain, "credentials"])?;
        let request = Self::authorized(self.client.post(url), account);
        let request = password.expose_secret(|pw| request.form(&[("login", login), ("password", pw)]));

        let response = Self::send(request).await?;
        if response.status().is_success() {
            tracing::debug!(login, "Created SMTP credential");
            Ok(())
        } else {
            let err = Self::rejection(response).await;
            tracing::error!(login, error = %err, "Failed to create SMTP credential");
            Err(err)
        }
    }

    #[tracing::instrument(skip(self, account), fields(provider = "Mailgun", domain = %account.domain))]
    async fn delete_credential(
        &self,
        account: &AccountBinding,
        login: &str,
    ) -> Result<(), ProviderError> {
        let url = self.endpoint(&["domains", &account.domain, "credentials", login])?;
        let request = Self::authorized(self.client.delete(url), account);

        let response = Self::send(request).await?;
        let status = response.status();
        if status.is_success() {
            tracing::debug!(login, "Deleted SMTP credential");
            Ok(())
        } else if status == StatusCode::NOT_FOUND {
            // Already gone upstream
            tracing::debug!(login, "SMTP credential already absent");
            Ok(())
        } else {
            let err = Self::rejection(response).await;
            tracing::error!(login, error = %err, "Failed to delete SMTP credential");
            Err(err)
        }
    }

    fn provider_name(&self) -> &'static str {
        "Mailgun"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_default_config_is_valid() {
        let config = MailgunConfig::default();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.provider_name(), "Mailgun");
    }

    #[rstest]
    #[case("", "base_url")]
    #[case("ftp://api.mailgun.net", "base_url")]
    #[case("not a url", "base_url")]
    #[case("mailto:ops@example.com", "base_url")]
    fn test_invalid_base_url(#[case] base_url: &str, #[case] field: &str) {
        let config = MailgunConfig {
            base_url: base_url.into(),
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains(field), "{err}");
    }

    #[rstest]
    #[case(Duration::from_millis(500))]
    #[case(Duration::from_secs(61))]
    fn test_timeout_bounds(#[case] timeout: Duration) {
        let config = MailgunConfig {
            timeout,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { ref field, .. }) if field == "timeout"
        ));
    }

    #[test]
    fn test_config_humantime_timeout() {
        let config: MailgunConfig =
            serde_json::from_str(r#"{"base_url":"https://api.eu.mailgun.net","timeout":"15s"}"#)
                .unwrap();
        assert_eq!(config.timeout, Duration::from_secs(15));
    }

    #[test]
    fn test_endpoint_escapes_login_segment() {
        let provider = MailgunProvider::new(MailgunConfig {
            base_url: "https://api.mailgun.net/".into(),
            ..Default::default()
        })
        .unwrap();
        let url = provider
            .endpoint(&["domains", "example.com", "credentials", "vault.ab/c"])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.mailgun.net/v3/domains/example.com/credentials/vault.ab%2Fc"
        );
    }

    #[test]
    fn test_probe_endpoint_has_query() {
        let provider = MailgunProvider::new(MailgunConfig::default()).unwrap();
        let url = provider.probe_endpoint(&["domains"]).unwrap();
        assert_eq!(url.as_str(), "https://api.mailgun.net/v3/domains?limit=1&skip=0");
    }
}

//! Error types for engine operations
//!
//! The hierarchy mirrors what the host needs to decide on a response:
//! - [`EngineError`]: top-level error returned by every engine entry point
//! - [`ValidationError`]: bad configuration input, never persisted
//! - [`ProviderError`]: the external account system refused or was unreachable
//! - [`StorageError`]: the host storage view failed to read, write or decode
//!
//! ```
//! use mgsecret::core::{EngineError, ValidationError};
//!
//! let err: EngineError = ValidationError::MissingField { field: "domain" }.into();
//! assert!(err.is_user_facing());
//! assert!(err.to_string().contains("domain"));
//! ```

use thiserror::Error;

/// Top-level engine error
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration input was rejected
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// No configuration has been written for this mount
    #[error("Mailgun backend is not configured")]
    NotConfigured,

    /// The external provider rejected an operation
    #[error("Unable to {operation} Mailgun credentials: {source}")]
    Provider {
        /// Short verb describing the attempted operation
        operation: &'static str,
        /// Underlying provider error
        #[source]
        source: ProviderError,
    },

    /// The local randomness source failed
    #[error("Unable to generate credential: {reason}")]
    Generation {
        /// What could not be generated and why
        reason: String,
    },

    /// The lease carries no internal state for this engine
    #[error("Lease is missing internal field '{key}'")]
    MissingInternalState {
        /// Internal data key that was expected
        key: &'static str,
    },

    /// Storage failure
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// No handler exists for this operation and path
    #[error("Unsupported operation '{operation}' on path '{path}'")]
    UnsupportedOperation {
        /// Operation name
        operation: String,
        /// Request path
        path: String,
    },
}

impl EngineError {
    /// Wrap a provider error with the operation that produced it
    pub fn provider(operation: &'static str, source: ProviderError) -> Self {
        Self::Provider { operation, source }
    }

    /// Whether this failure belongs in an error response to the caller rather
    /// than in the host's internal error channel.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            Self::Validation(_)
                | Self::NotConfigured
                | Self::Provider { .. }
                | Self::MissingInternalState { .. }
        )
    }
}

/// Configuration validation errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field was absent or empty
    #[error("Required field '{field}' is not set")]
    MissingField {
        /// Field name
        field: &'static str,
    },

    /// A field was present but could not be decoded
    #[error("Invalid value for field '{field}': {reason}")]
    InvalidField {
        /// Field name
        field: &'static str,
        /// Why decoding failed
        reason: String,
    },

    /// The API key does not authenticate against the provider
    #[error("'api_key' is not valid")]
    InvalidApiKey,

    /// The domain is not visible under the API key
    #[error("'domain' is not valid")]
    InvalidDomain,
}

/// Errors reported by a [`CredentialProvider`](crate::provider::CredentialProvider)
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// The provider answered with a non-success status
    #[error("provider rejected request (HTTP {status}): {message}")]
    Rejected {
        /// HTTP status code
        status: u16,
        /// Provider supplied message, or the raw body
        message: String,
    },

    /// The request never produced a response
    #[error("transport failure: {0}")]
    Transport(String),

    /// The provider is not usable for reasons other than transport
    #[error("provider unavailable: {0}")]
    Unavailable(String),
}

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    /// Failed to read an entry
    #[error("Failed to read storage entry '{key}': {source}")]
    ReadFailure {
        /// Storage key
        key: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Failed to write or delete an entry
    #[error("Failed to write storage entry '{key}': {source}")]
    WriteFailure {
        /// Storage key
        key: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The entry could not be encoded to, or decoded from, JSON
    #[error("Invalid JSON for storage entry '{key}': {source}")]
    Decode {
        /// Storage key
        key: String,
        /// Underlying JSON error
        #[source]
        source: serde_json::Error,
    },
}

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;

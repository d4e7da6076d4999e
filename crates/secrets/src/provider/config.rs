//! Provider configuration trait and error types

/// Configuration error types
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Invalid configuration value
    #[error("Invalid configuration: {field}: {reason}")]
    InvalidValue {
        /// Offending field
        field: String,
        /// What is wrong with it
        reason: String,
    },

    /// Missing required configuration
    #[error("Missing required configuration: {field}")]
    MissingRequired {
        /// Field that must be set
        field: String,
    },
}

/// Transport-level provider configuration
///
/// Implementations check every parameter in `validate()` before a provider
/// is built from them, and report problems with the field name attached.
pub trait ProviderConfig: Send + Sync + Clone {
    /// Validate configuration parameters
    fn validate(&self) -> Result<(), ConfigError>;

    /// Static string identifying the provider in logs
    fn provider_name(&self) -> &'static str;
}

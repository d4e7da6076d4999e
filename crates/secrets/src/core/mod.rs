//! Core types for the secrets engine

mod duration;
mod error;
pub mod secret_string;

pub use duration::parse_duration_field;
pub use error::{EngineError, ProviderError, Result, StorageError, ValidationError};
pub use secret_string::SecretString;

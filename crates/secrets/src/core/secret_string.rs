//! Secret string type with automatic zeroization
//!
//! [`SecretString`] holds API keys and generated passwords. Access goes
//! through a closure so the plain value does not leak into longer-lived
//! bindings, and memory is zeroed on drop.

use serde::{Deserialize, Serialize};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Secret string with automatic memory zeroization
///
/// ```
/// use mgsecret::SecretString;
///
/// let key = SecretString::new("key-3ax6xnjp29jd6fds4gc373sgvjxteol0");
/// assert_eq!(key.expose_secret(str::len), 36);
/// assert_eq!(format!("{key:?}"), "[REDACTED]");
/// ```
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SecretString {
    inner: String,
}

impl SecretString {
    /// Creates a new secret from any string-like value
    pub fn new<S: Into<String>>(s: S) -> Self {
        Self { inner: s.into() }
    }

    /// Accesses the secret value within a closure scope
    pub fn expose_secret<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&str) -> R,
    {
        f(&self.inner)
    }

    /// Returns the length without exposing content
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Checks if empty without exposing content
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl PartialEq for SecretString {
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}

impl Eq for SecretString {}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl fmt::Display for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

// Redacted on the default path; storage opts into `exposed` explicitly.
impl Serialize for SecretString {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str("[REDACTED]")
    }
}

impl<'de> Deserialize<'de> for SecretString {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        String::deserialize(deserializer).map(SecretString::new)
    }
}

/// Serde adapter that writes the plain secret.
///
/// Only for records that go to seal-wrapped storage:
/// `#[serde(with = "crate::core::secret_string::exposed")]`.
pub mod exposed {
    use super::SecretString;
    use serde::{Deserialize, Deserializer, Serializer};

    /// Serialize the unredacted value
    pub fn serialize<S>(secret: &SecretString, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        secret.expose_secret(|value| serializer.serialize_str(value))
    }

    /// Deserialize from a plain string
    pub fn deserialize<'de, D>(deserializer: D) -> Result<SecretString, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer).map(SecretString::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    #[test]
    fn test_debug_and_display_are_redacted() {
        let secret = SecretString::new("super_secret_password");
        assert_eq!(format!("{secret:?}"), "[REDACTED]");
        assert_eq!(format!("{secret}"), "[REDACTED]");
    }

    #[test]
    fn test_default_serialize_is_redacted() {
        let secret = SecretString::new("should_be_redacted");
        let json = serde_json::to_string(&secret).unwrap();
        assert_eq!(json, "\"[REDACTED]\"");
    }

    #[test]
    fn test_exposed_adapter_round_trips() {
        #[derive(Serialize, serde::Deserialize)]
        struct Record {
            #[serde(with = "exposed")]
            key: SecretString,
        }

        let json = serde_json::to_string(&Record {
            key: SecretString::new("k1"),
        })
        .unwrap();
        assert_eq!(json, r#"{"key":"k1"}"#);

        let back: Record = serde_json::from_str(&json).unwrap();
        assert_eq!(back.key, SecretString::new("k1"));
    }

    #[test]
    fn test_len_and_is_empty() {
        assert!(SecretString::new("").is_empty());
        assert_eq!(SecretString::new("12345").len(), 5);
    }
}

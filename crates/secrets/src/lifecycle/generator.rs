//! Username and password generation

use rand::TryRngCore;
use rand::rngs::OsRng;

use crate::core::{EngineError, SecretString};

/// Fixed username prefix
pub const USERNAME_PREFIX: &str = "vault";
/// Length of the random username suffix
pub const USERNAME_SUFFIX_LEN: usize = 8;
/// Length of generated passwords
pub const PASSWORD_LEN: usize = 32;

const BASE62: &[u8; 62] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";
const LOWER_BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// A freshly generated, not yet registered, SMTP identity
#[derive(Debug, Clone)]
pub struct GeneratedCredential {
    /// `vault.<suffix>`
    pub username: String,
    /// Random alphanumeric password
    pub password: SecretString,
}

/// Draw `len` characters uniformly from `alphabet` using rejection sampling
/// over random bytes.
fn random_string<R: TryRngCore>(
    rng: &mut R,
    alphabet: &[u8],
    len: usize,
    what: &str,
) -> Result<String, EngineError> {
    debug_assert!(!alphabet.is_empty() && alphabet.len() <= 256);
    // Largest multiple of the alphabet size that fits in a byte.
    let limit = 256 - (256 % alphabet.len());
    let mut out = String::with_capacity(len);
    let mut buf = [0u8; 64];

    while out.len() < len {
        rng.try_fill_bytes(&mut buf)
            .map_err(|e| EngineError::Generation {
                reason: format!("random {what}: {e}"),
            })?;
        for &byte in &buf {
            if usize::from(byte) < limit {
                out.push(char::from(alphabet[usize::from(byte) % alphabet.len()]));
                if out.len() == len {
                    break;
                }
            }
        }
    }
    Ok(out)
}

/// Generate a username and password from `rng`
///
/// The suffix is uniform over `[a-z0-9]` and the password over
/// `[A-Za-z0-9]`. Nothing is returned unless both values were produced.
pub fn generate_with<R: TryRngCore>(rng: &mut R) -> Result<GeneratedCredential, EngineError> {
    let suffix = random_string(rng, LOWER_BASE36, USERNAME_SUFFIX_LEN, "username suffix")?;
    let password = random_string(rng, BASE62, PASSWORD_LEN, "password")?;
    Ok(GeneratedCredential {
        username: format!("{USERNAME_PREFIX}.{suffix}"),
        password: SecretString::new(password),
    })
}

/// Generate a credential from the operating system's CSPRNG
pub fn generate() -> Result<GeneratedCredential, EngineError> {
    generate_with(&mut OsRng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::fmt;

    #[derive(Debug)]
    struct EntropyUnavailable;

    impl fmt::Display for EntropyUnavailable {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("entropy source unavailable")
        }
    }

    struct FailingRng;

    impl TryRngCore for FailingRng {
        type Error = EntropyUnavailable;

        fn try_next_u32(&mut self) -> Result<u32, Self::Error> {
            Err(EntropyUnavailable)
        }

        fn try_next_u64(&mut self) -> Result<u64, Self::Error> {
            Err(EntropyUnavailable)
        }

        fn try_fill_bytes(&mut self, _dst: &mut [u8]) -> Result<(), Self::Error> {
            Err(EntropyUnavailable)
        }
    }

    #[test]
    fn test_username_format() {
        let credential = generate().unwrap();
        let suffix = credential
            .username
            .strip_prefix("vault.")
            .expect("prefix");
        assert_eq!(suffix.len(), USERNAME_SUFFIX_LEN);
        assert!(
            suffix
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        );
    }

    #[test]
    fn test_password_format() {
        let credential = generate().unwrap();
        credential.password.expose_secret(|pw| {
            assert_eq!(pw.len(), PASSWORD_LEN);
            assert!(pw.chars().all(|c| c.is_ascii_alphanumeric()));
        });
    }

    #[test]
    fn test_usernames_are_unique() {
        let usernames: HashSet<String> = (0..1000)
            .map(|_| generate().unwrap().username)
            .collect();
        assert_eq!(usernames.len(), 1000);
    }

    #[test]
    fn test_passwords_are_independent() {
        let a = generate().unwrap();
        let b = generate().unwrap();
        assert_ne!(a.password, b.password);
    }

    #[test]
    fn test_entropy_failure_is_generation_error() {
        let err = generate_with(&mut FailingRng).unwrap_err();
        match err {
            EngineError::Generation { reason } => {
                assert!(reason.contains("username suffix"));
                assert!(reason.contains("entropy source unavailable"));
            }
            other => panic!("expected Generation error, got {other:?}"),
        }
    }
}

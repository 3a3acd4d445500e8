use std::fmt;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::rand_core::RngCore;

use super::errors::TokenError;

/// Process-wide HMAC secret used to sign session tokens.
///
/// Built once at start-up and handed to [`TokenCodec`](super::TokenCodec).
/// The bytes are never printed; `Debug` only reports the length.
#[derive(Clone, PartialEq, Eq)]
pub struct SigningKey {
    bytes: Vec<u8>,
    generated: bool,
}

impl SigningKey {
    /// Length in bytes of a generated secret (256 bits, matching HS256).
    pub const GENERATED_LENGTH: usize = 32;

    /// Wrap an explicit secret.
    ///
    /// # Errors
    /// * `MissingSecret` - Secret is empty
    pub fn new(secret: impl Into<Vec<u8>>) -> Result<Self, TokenError> {
        let bytes = secret.into();
        if bytes.is_empty() {
            return Err(TokenError::MissingSecret);
        }

        Ok(Self {
            bytes,
            generated: false,
        })
    }

    /// Draw a fresh random secret from the operating system RNG.
    ///
    /// # Errors
    /// * `KeyGenerationFailed` - OS entropy source is unavailable
    pub fn generate() -> Result<Self, TokenError> {
        let mut bytes = vec![0u8; Self::GENERATED_LENGTH];
        OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|e| TokenError::KeyGenerationFailed(e.to_string()))?;

        Ok(Self {
            bytes,
            generated: true,
        })
    }

    /// Use the configured secret, or generate one when none is configured.
    ///
    /// An empty string counts as not configured: the process never signs with
    /// an empty key.
    pub fn from_config(secret: Option<&str>) -> Result<Self, TokenError> {
        match secret {
            Some(secret) if !secret.is_empty() => Self::new(secret.as_bytes()),
            _ => Self::generate(),
        }
    }

    /// Whether this key was generated at start-up rather than configured.
    pub fn is_generated(&self) -> bool {
        self.generated
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningKey")
            .field("len", &self.bytes.len())
            .field("generated", &self.generated)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_empty_secret() {
        assert_eq!(SigningKey::new(Vec::new()), Err(TokenError::MissingSecret));
    }

    #[test]
    fn test_generate_produces_distinct_keys() {
        let first = SigningKey::generate().unwrap();
        let second = SigningKey::generate().unwrap();

        assert_eq!(first.as_bytes().len(), SigningKey::GENERATED_LENGTH);
        assert!(first.is_generated());
        assert_ne!(first.as_bytes(), second.as_bytes());
    }

    #[test]
    fn test_from_config() {
        let configured = SigningKey::from_config(Some("configured-secret")).unwrap();
        assert!(!configured.is_generated());
        assert_eq!(configured.as_bytes(), b"configured-secret");

        assert!(SigningKey::from_config(None).unwrap().is_generated());
        assert!(SigningKey::from_config(Some("")).unwrap().is_generated());
    }

    #[test]
    fn test_debug_does_not_print_secret() {
        let key = SigningKey::new("super-secret-value").unwrap();
        let debug = format!("{:?}", key);
        assert!(!debug.contains("super-secret-value"));
    }
}

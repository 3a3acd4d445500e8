use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use jsonwebtoken::crypto;
use jsonwebtoken::decode;
use jsonwebtoken::encode;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;

use super::claims::SessionClaims;
use super::errors::TokenError;
use super::secret::SigningKey;

/// Session token codec.
///
/// Issues and verifies HS256 (HMAC with SHA-256) JWTs carrying a
/// [`SessionClaims`]. Verification is stateless: nothing outside the codec's
/// own key is consulted.
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
    ttl: Duration,
}

impl TokenCodec {
    /// Default session lifetime.
    pub const DEFAULT_TTL_HOURS: i64 = 24;

    /// Create a codec signing with `key`, issuing tokens valid for `ttl`.
    pub fn new(key: &SigningKey, ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(key.as_bytes()),
            decoding_key: DecodingKey::from_secret(key.as_bytes()),
            algorithm: Algorithm::HS256,
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a signed token for `user_id`, valid from `now` until `now + ttl`.
    ///
    /// # Errors
    /// * `SigningFailed` - Token encoding failed
    pub fn issue(&self, user_id: i64, now: DateTime<Utc>) -> Result<String, TokenError> {
        let claims = SessionClaims::for_user(user_id, now, self.ttl);
        let header = Header::new(self.algorithm);

        encode(&header, &claims, &self.encoding_key)
            .map_err(|e| TokenError::SigningFailed(e.to_string()))
    }

    /// Verify a token at instant `now` and return its subject.
    ///
    /// The signature over `header.payload` is checked before anything inside
    /// the token is decoded, so altering any character of any segment is
    /// reported as `InvalidSignature`.
    ///
    /// # Errors
    /// * `Malformed` - Token is not three segments, or its content is not a session claim
    /// * `InvalidSignature` - Signature does not match this codec's key
    /// * `Expired` - `now` is at or past the claim's expiry
    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<i64, TokenError> {
        let (message, signature) = split_token(token)?;

        let signature_valid =
            crypto::verify(signature, message.as_bytes(), &self.decoding_key, self.algorithm)
                .map_err(|e| TokenError::Malformed(e.to_string()))?;
        if !signature_valid {
            return Err(TokenError::InvalidSignature);
        }

        let mut validation = Validation::new(self.algorithm);
        // Expiry is checked below against the caller's clock, with no leeway.
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["sub", "exp"]);

        let token_data = decode::<SessionClaims>(token, &self.decoding_key, &validation)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                _ => TokenError::Malformed(e.to_string()),
            })?;

        if token_data.claims.is_expired(now.timestamp()) {
            return Err(TokenError::Expired);
        }

        token_data.claims.user_id()
    }
}

fn split_token(token: &str) -> Result<(&str, &str), TokenError> {
    let malformed = || TokenError::Malformed("expected header.payload.signature".to_string());

    let (message, signature) = token.rsplit_once('.').ok_or_else(malformed)?;
    let (header, payload) = message.split_once('.').ok_or_else(malformed)?;

    if header.is_empty() || payload.is_empty() || signature.is_empty() || payload.contains('.') {
        return Err(malformed());
    }

    Ok((message, signature))
}

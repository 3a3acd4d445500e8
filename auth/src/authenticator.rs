use chrono::DateTime;
use chrono::Utc;

use crate::password::PasswordError;
use crate::password::PasswordHasher;
use crate::token::TokenCodec;
use crate::token::TokenError;

/// Authentication coordinator combining password verification and token issuance.
///
/// Holds only immutable state, so a single instance is shared by every request.
pub struct Authenticator {
    password_hasher: PasswordHasher,
    token_codec: TokenCodec,
    decoy_digest: String,
}

/// Plaintext behind the decoy digest. The outcome of verifying against it is
/// discarded, so its value never grants anything.
const DECOY_PASSWORD: &str = "decoy-password-for-unknown-users";

/// Result of successful authentication.
#[derive(Debug, Clone)]
pub struct AuthenticationResult {
    /// Signed session token
    pub access_token: String,
}

/// Authentication operation errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum AuthenticationError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Password error: {0}")]
    PasswordError(#[from] PasswordError),

    #[error("Token error: {0}")]
    TokenError(#[from] TokenError),
}

impl Authenticator {
    /// Create a new authenticator.
    ///
    /// Hashes a decoy password once with the configured work factor, so that
    /// rejecting an unknown user costs the same as rejecting a wrong password.
    ///
    /// # Arguments
    /// * `password_hasher` - Hasher configured with the process work factor
    /// * `token_codec` - Codec configured with the process signing key
    ///
    /// # Errors
    /// * `HashingFailed` - The decoy digest could not be produced
    pub fn new(
        password_hasher: PasswordHasher,
        token_codec: TokenCodec,
    ) -> Result<Self, PasswordError> {
        let decoy_digest = password_hasher.hash(DECOY_PASSWORD)?;

        Ok(Self {
            password_hasher,
            token_codec,
            decoy_digest,
        })
    }

    /// Hash a password for storage.
    ///
    /// # Errors
    /// * `HashingFailed` - Hashing operation failed
    pub fn hash_password(&self, password: &str) -> Result<String, PasswordError> {
        self.password_hasher.hash(password)
    }

    /// Check a plaintext password against a stored digest.
    ///
    /// # Errors
    /// * `InvalidCredentials` - Password does not match
    /// * `PasswordError` - Stored digest could not be used
    pub fn verify_password(
        &self,
        password: &str,
        stored_hash: &str,
    ) -> Result<(), AuthenticationError> {
        self.password_hasher
            .verify(password, stored_hash)
            .map_err(|e| match e {
                PasswordError::Mismatch => AuthenticationError::InvalidCredentials,
                other => AuthenticationError::PasswordError(other),
            })
    }

    /// Verify credentials and issue a session token.
    ///
    /// # Arguments
    /// * `password` - Plaintext password to verify
    /// * `stored_hash` - Stored password hash
    /// * `user_id` - Subject of the issued token
    /// * `now` - Issue instant
    ///
    /// # Errors
    /// * `InvalidCredentials` - Password does not match
    /// * `PasswordError` - Password verification failed
    /// * `TokenError` - Token generation failed
    pub fn authenticate(
        &self,
        password: &str,
        stored_hash: &str,
        user_id: i64,
        now: DateTime<Utc>,
    ) -> Result<AuthenticationResult, AuthenticationError> {
        self.verify_password(password, stored_hash)?;

        let access_token = self.token_codec.issue(user_id, now)?;

        Ok(AuthenticationResult { access_token })
    }

    /// Reject a login for a username with no account.
    ///
    /// Runs a full verification against the decoy digest and discards the
    /// outcome, so the call takes as long as a wrong-password rejection.
    pub fn reject_unknown_user(&self, password: &str) -> AuthenticationError {
        match self.password_hasher.verify(password, &self.decoy_digest) {
            Ok(()) | Err(PasswordError::Mismatch) => AuthenticationError::InvalidCredentials,
            Err(e) => AuthenticationError::PasswordError(e),
        }
    }

    /// Issue a session token without password verification.
    ///
    /// Used right after registration, when the caller has just proven
    /// knowledge of the password by choosing it.
    pub fn issue_token(&self, user_id: i64, now: DateTime<Utc>) -> Result<String, TokenError> {
        self.token_codec.issue(user_id, now)
    }

    /// Validate a session token and return its subject.
    pub fn validate_token(&self, token: &str, now: DateTime<Utc>) -> Result<i64, TokenError> {
        self.token_codec.verify(token, now)
    }
}

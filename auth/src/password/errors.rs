use thiserror::Error;

/// Error type for password operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PasswordError {
    #[error("Password hashing failed: {0}")]
    HashingFailed(String),

    #[error("Stored password digest is invalid: {0}")]
    InvalidDigest(String),

    /// The candidate does not match the digest. This is an authentication
    /// outcome, not a system failure.
    #[error("Password does not match")]
    Mismatch,
}

use thiserror::Error;

/// Error type for session token operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("Signing secret is missing")]
    MissingSecret,

    #[error("Failed to generate signing secret: {0}")]
    KeyGenerationFailed(String),

    #[error("Failed to sign token: {0}")]
    SigningFailed(String),

    #[error("Token signature is invalid")]
    InvalidSignature,

    #[error("Token is expired")]
    Expired,

    #[error("Token is malformed: {0}")]
    Malformed(String),
}

impl TokenError {
    /// Short, stable label for diagnostics. Never contains token material.
    pub fn kind(&self) -> &'static str {
        match self {
            TokenError::MissingSecret => "missing_secret",
            TokenError::KeyGenerationFailed(_) => "key_generation_failed",
            TokenError::SigningFailed(_) => "signing_failed",
            TokenError::InvalidSignature => "invalid_signature",
            TokenError::Expired => "expired",
            TokenError::Malformed(_) => "malformed",
        }
    }
}

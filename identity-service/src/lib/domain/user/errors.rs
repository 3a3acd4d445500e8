use thiserror::Error;

/// Error for Username validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UsernameError {
    #[error("Username too short: minimum {min} characters, got {actual}")]
    TooShort { min: usize, actual: usize },

    #[error("Username too long: maximum {max} characters, got {actual}")]
    TooLong { max: usize, actual: usize },

    #[error(
        "Username contains invalid characters (only alphanumeric, underscore, and hyphen allowed)"
    )]
    InvalidCharacters,
}

/// Error for credential payload validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CredentialsError {
    #[error("Password must not be empty")]
    EmptyPassword,
}

/// Top-level error for all authentication and account operations.
///
/// Lower-level password, token and storage errors are translated into this
/// type by the service; nothing below it reaches a transport.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    /// Unknown username, wrong password or wrong old password. One variant
    /// for all of them so a caller cannot probe which usernames exist.
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Username already exists: {0}")]
    UsernameAlreadyExists(String),

    #[error("User not found: {0}")]
    NotFound(String),

    #[error("Password hashing failed: {0}")]
    Hashing(String),

    #[error("Token signing failed: {0}")]
    Signing(String),

    #[error("Credential store error: {0}")]
    StoreFailure(String),
}

impl AuthError {
    /// Stable machine-readable identifier for the error class.
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::InvalidCredentials => "invalid_credentials",
            AuthError::UsernameAlreadyExists(_) => "user_already_exists",
            AuthError::NotFound(_) => "not_found",
            AuthError::Hashing(_) => "hashing_failure",
            AuthError::Signing(_) => "signing_failure",
            AuthError::StoreFailure(_) => "store_failure",
        }
    }
}

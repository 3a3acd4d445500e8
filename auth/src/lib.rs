//! Authentication utilities library
//!
//! Provides the credential and session primitives of the memory-cards backend:
//! - Password hashing (Argon2id, PHC string digests)
//! - Signed session tokens (HS256 JWT) with an explicit clock
//! - Authentication coordination
//!
//! The service crate defines its own ports and adapts these implementations.
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! assert!(hasher.verify("my_password", &hash).is_ok());
//! ```
//!
//! ## Session Tokens
//! ```
//! use auth::{SigningKey, TokenCodec};
//! use chrono::{Duration, Utc};
//!
//! let key = SigningKey::new("secret_key_at_least_32_bytes_long!").unwrap();
//! let codec = TokenCodec::new(&key, Duration::hours(24));
//! let now = Utc::now();
//! let token = codec.issue(42, now).unwrap();
//! assert_eq!(codec.verify(&token, now).unwrap(), 42);
//! ```
//!
//! ## Complete Authentication Flow
//! ```
//! use auth::{Authenticator, PasswordHasher, SigningKey, TokenCodec};
//! use chrono::{Duration, Utc};
//!
//! let key = SigningKey::generate().unwrap();
//! let auth = Authenticator::new(
//!     PasswordHasher::new(),
//!     TokenCodec::new(&key, Duration::hours(24)),
//! )
//! .unwrap();
//!
//! // Register: hash password
//! let hash = auth.hash_password("password123").unwrap();
//!
//! // Login: verify and issue token
//! let now = Utc::now();
//! let result = auth.authenticate("password123", &hash, 42, now).unwrap();
//!
//! // Validate token
//! let user_id = auth.validate_token(&result.access_token, now).unwrap();
//! assert_eq!(user_id, 42);
//! ```

pub mod authenticator;
pub mod password;
pub mod token;

// Re-export commonly used items
pub use authenticator::AuthenticationError;
pub use authenticator::AuthenticationResult;
pub use authenticator::Authenticator;
pub use password::HashingParams;
pub use password::PasswordError;
pub use password::PasswordHasher;
pub use token::SessionClaims;
pub use token::SigningKey;
pub use token::TokenCodec;
pub use token::TokenError;

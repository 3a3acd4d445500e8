use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

use super::errors::TokenError;

/// Session claim carried inside a signed token.
///
/// `sub` holds the numeric user id as a decimal string (RFC 7519 requires a
/// string subject). `jti` makes every issued token unique, even two tokens for
/// the same user in the same second.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionClaims {
    /// Subject (user identifier)
    pub sub: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// JWT ID (unique token identifier)
    pub jti: String,
}

impl SessionClaims {
    /// Create claims for a user session.
    ///
    /// # Arguments
    /// * `user_id` - Store-assigned user identifier
    /// * `issued_at` - Issue instant
    /// * `ttl` - Lifetime of the session
    pub fn for_user(user_id: i64, issued_at: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            sub: user_id.to_string(),
            iat: issued_at.timestamp(),
            exp: (issued_at + ttl).timestamp(),
            jti: Uuid::new_v4().to_string(),
        }
    }

    /// Parse the subject back into a user id.
    pub fn user_id(&self) -> Result<i64, TokenError> {
        self.sub
            .parse::<i64>()
            .map_err(|_| TokenError::Malformed("subject is not a user id".to_string()))
    }

    /// A claim is expired from its `exp` second onwards.
    pub fn is_expired(&self, current_timestamp: i64) -> bool {
        current_timestamp >= self.exp
    }
}

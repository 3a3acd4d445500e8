use async_trait::async_trait;

use crate::domain::user::models::AuthSession;
use crate::domain::user::models::ChangePasswordCommand;
use crate::domain::user::models::Credentials;
use crate::domain::user::models::NewUser;
use crate::domain::user::models::Profile;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::models::Username;
use crate::user::errors::AuthError;

/// Port for the authentication capability.
///
/// Collections, cards and training are separate capabilities; the transport
/// composes them and hands each the caller id resolved by the identity
/// middleware.
#[async_trait]
pub trait AuthServicePort: Send + Sync + 'static {
    /// Register a new user and open a session for it.
    ///
    /// # Errors
    /// * `UsernameAlreadyExists` - Username is taken, whether seen by the pre-check or by the store
    /// * `Hashing` - Password hashing failed
    /// * `Signing` - Token issuance failed
    /// * `StoreFailure` - Credential store operation failed
    async fn register(&self, credentials: Credentials) -> Result<AuthSession, AuthError>;

    /// Verify credentials and open a session.
    ///
    /// # Errors
    /// * `InvalidCredentials` - Unknown username or wrong password (indistinguishable)
    /// * `StoreFailure` - Credential store operation failed
    async fn login(&self, credentials: Credentials) -> Result<AuthSession, AuthError>;

    /// Public projection of a user.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `StoreFailure` - Credential store operation failed
    async fn get_profile(&self, id: UserId) -> Result<Profile, AuthError>;

    /// Rename a user.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `UsernameAlreadyExists` - New username belongs to another user
    /// * `StoreFailure` - Credential store operation failed
    async fn update_username(&self, id: UserId, username: Username)
        -> Result<Profile, AuthError>;

    /// Replace a user's password after checking the current one.
    ///
    /// Sessions issued before the change stay valid until they expire.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `InvalidCredentials` - Old password does not match
    /// * `Hashing` - Password hashing failed
    /// * `StoreFailure` - Credential store operation failed
    async fn update_password(
        &self,
        id: UserId,
        command: ChangePasswordCommand,
    ) -> Result<(), AuthError>;
}

/// Persistence operations for user credentials.
///
/// Implementations enforce username uniqueness atomically on `create` and
/// `update_username`; a violation is reported as `UsernameAlreadyExists`.
#[async_trait]
pub trait UserRepository: Send + Sync + 'static {
    /// Persist new user to storage and assign its id.
    ///
    /// # Errors
    /// * `UsernameAlreadyExists` - Username is already taken
    /// * `StoreFailure` - Database operation failed
    async fn create(&self, user: NewUser) -> Result<User, AuthError>;

    /// Retrieve user by identifier.
    ///
    /// # Errors
    /// * `StoreFailure` - Database operation failed
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, AuthError>;

    /// Retrieve user by username.
    ///
    /// # Errors
    /// * `StoreFailure` - Database operation failed
    async fn find_by_username(&self, username: &Username) -> Result<Option<User>, AuthError>;

    /// Replace a user's username, leaving every other field as stored.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `UsernameAlreadyExists` - New username is already taken
    /// * `StoreFailure` - Database operation failed
    async fn update_username(&self, id: UserId, username: &Username) -> Result<User, AuthError>;

    /// Replace a user's password digest, leaving every other field as stored.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `StoreFailure` - Database operation failed
    async fn update_password_hash(&self, id: UserId, password_hash: &str)
        -> Result<(), AuthError>;
}

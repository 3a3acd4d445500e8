use std::sync::Arc;

use async_trait::async_trait;
use auth::AuthenticationError;
use auth::Authenticator;
use chrono::Utc;

use crate::domain::user::models::AuthSession;
use crate::domain::user::models::ChangePasswordCommand;
use crate::domain::user::models::Credentials;
use crate::domain::user::models::NewUser;
use crate::domain::user::models::Password;
use crate::domain::user::models::Profile;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::models::Username;
use crate::user::errors::AuthError;
use crate::user::ports::AuthServicePort;
use crate::user::ports::UserRepository;

/// Domain service implementation for authentication and account operations.
///
/// Stateless apart from the injected repository and authenticator. Argon2 work
/// runs on the blocking pool so request tasks are never stalled by it.
pub struct AuthService<UR>
where
    UR: UserRepository,
{
    repository: Arc<UR>,
    authenticator: Arc<Authenticator>,
}

impl<UR> AuthService<UR>
where
    UR: UserRepository,
{
    /// Create a new auth service with injected dependencies.
    ///
    /// # Arguments
    /// * `repository` - Credential store implementation
    /// * `authenticator` - Password hasher and token codec
    pub fn new(repository: Arc<UR>, authenticator: Arc<Authenticator>) -> Self {
        Self {
            repository,
            authenticator,
        }
    }

    async fn hash_password(&self, password: Password) -> Result<String, AuthError> {
        let authenticator = Arc::clone(&self.authenticator);

        tokio::task::spawn_blocking(move || authenticator.hash_password(password.expose()))
            .await
            .map_err(|e| AuthError::Hashing(e.to_string()))?
            .map_err(|e| AuthError::Hashing(e.to_string()))
    }

    async fn verify_password(&self, password: Password, stored_hash: String) -> Result<(), AuthError> {
        let authenticator = Arc::clone(&self.authenticator);

        tokio::task::spawn_blocking(move || {
            authenticator.verify_password(password.expose(), &stored_hash)
        })
        .await
        .map_err(|e| AuthError::Hashing(e.to_string()))?
        .map_err(translate_authentication_error)
    }

    /// Verify the password of a stored user and issue a session token for it.
    async fn authenticate(&self, password: Password, user: &User) -> Result<String, AuthError> {
        let authenticator = Arc::clone(&self.authenticator);
        let stored_hash = user.password_hash.clone();
        let user_id = user.id.0;

        tokio::task::spawn_blocking(move || {
            authenticator.authenticate(password.expose(), &stored_hash, user_id, Utc::now())
        })
        .await
        .map_err(|e| AuthError::Hashing(e.to_string()))?
        .map(|result| result.access_token)
        .map_err(translate_authentication_error)
    }

    /// Spend a full verification on a username with no account.
    async fn reject_unknown_user(&self, password: Password) -> AuthError {
        let authenticator = Arc::clone(&self.authenticator);

        match tokio::task::spawn_blocking(move || authenticator.reject_unknown_user(password.expose()))
            .await
        {
            Ok(e) => translate_authentication_error(e),
            Err(e) => AuthError::Hashing(e.to_string()),
        }
    }

    fn open_session(&self, user: User) -> Result<AuthSession, AuthError> {
        let token = self
            .authenticator
            .issue_token(user.id.0, Utc::now())
            .map_err(|e| AuthError::Signing(e.to_string()))?;

        Ok(AuthSession {
            token,
            id: user.id,
            username: user.username,
        })
    }

    async fn fetch_user(&self, id: UserId) -> Result<User, AuthError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(AuthError::NotFound(id.to_string()))
    }
}

fn translate_authentication_error(e: AuthenticationError) -> AuthError {
    match e {
        AuthenticationError::InvalidCredentials => AuthError::InvalidCredentials,
        AuthenticationError::PasswordError(e) => AuthError::Hashing(e.to_string()),
        AuthenticationError::TokenError(e) => AuthError::Signing(e.to_string()),
    }
}

#[async_trait]
impl<UR> AuthServicePort for AuthService<UR>
where
    UR: UserRepository,
{
    async fn register(&self, credentials: Credentials) -> Result<AuthSession, AuthError> {
        let Credentials { username, password } = credentials;

        // The store enforces uniqueness again on insert; this only saves a hash.
        if self.repository.find_by_username(&username).await?.is_some() {
            return Err(AuthError::UsernameAlreadyExists(username.to_string()));
        }

        let password_hash = self.hash_password(password).await?;

        let user = self
            .repository
            .create(NewUser {
                username,
                password_hash,
                created_at: Utc::now(),
            })
            .await?;

        tracing::info!(user_id = %user.id, "User registered");

        self.open_session(user)
    }

    async fn login(&self, credentials: Credentials) -> Result<AuthSession, AuthError> {
        let Credentials { username, password } = credentials;

        let user = match self.repository.find_by_username(&username).await? {
            Some(user) => user,
            None => {
                let err = self.reject_unknown_user(password).await;
                tracing::info!("Login rejected: unknown username");
                return Err(err);
            }
        };

        let token = self.authenticate(password, &user).await.inspect_err(|e| {
            if *e == AuthError::InvalidCredentials {
                tracing::info!(user_id = %user.id, "Login rejected: password mismatch");
            }
        })?;

        tracing::info!(user_id = %user.id, "User logged in");

        Ok(AuthSession {
            token,
            id: user.id,
            username: user.username,
        })
    }

    async fn get_profile(&self, id: UserId) -> Result<Profile, AuthError> {
        self.fetch_user(id).await.map(|ref user| user.into())
    }

    async fn update_username(
        &self,
        id: UserId,
        username: Username,
    ) -> Result<Profile, AuthError> {
        self.fetch_user(id).await?;

        if let Some(owner) = self.repository.find_by_username(&username).await? {
            if owner.id != id {
                return Err(AuthError::UsernameAlreadyExists(username.to_string()));
            }
        }

        let updated_user = self.repository.update_username(id, &username).await?;

        tracing::info!(user_id = %updated_user.id, "Username updated");

        Ok((&updated_user).into())
    }

    async fn update_password(
        &self,
        id: UserId,
        command: ChangePasswordCommand,
    ) -> Result<(), AuthError> {
        let user = self.fetch_user(id).await?;

        self.verify_password(command.old_password, user.password_hash)
            .await
            .inspect_err(|e| {
                if *e == AuthError::InvalidCredentials {
                    tracing::info!(user_id = %id, "Password change rejected: old password does not match");
                }
            })?;

        // Only the digest is written; a rename committed meanwhile survives.
        let password_hash = self.hash_password(command.new_password).await?;
        self.repository.update_password_hash(id, &password_hash).await?;

        tracing::info!(user_id = %id, "Password updated");

        Ok(())
    }
}

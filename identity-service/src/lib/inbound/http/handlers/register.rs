use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use super::ApiError;
use super::ApiSuccess;
use crate::domain::user::models::AuthSession;
use crate::domain::user::models::Credentials;
use crate::domain::user::models::Password;
use crate::domain::user::models::Username;
use crate::inbound::http::router::AppState;
use crate::user::errors::CredentialsError;
use crate::user::errors::UsernameError;

pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<ApiSuccess<AuthSessionResponseData>, ApiError> {
    state
        .auth_service
        .register(body.try_into_credentials()?)
        .await
        .map_err(ApiError::from)
        .map(|ref session| ApiSuccess::new(StatusCode::CREATED, session.into()))
}

/// HTTP request body for registering a user (raw JSON)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RegisterRequest {
    username: String,
    password: String,
}

#[derive(Debug, Clone, Error)]
enum ParseRegisterRequestError {
    #[error("Invalid username: {0}")]
    Username(#[from] UsernameError),

    #[error("Invalid password: {0}")]
    Password(#[from] CredentialsError),
}

impl RegisterRequest {
    fn try_into_credentials(self) -> Result<Credentials, ParseRegisterRequestError> {
        let username = Username::new(self.username)?;
        let password = Password::new(self.password)?;
        Ok(Credentials::new(username, password))
    }
}

impl From<ParseRegisterRequestError> for ApiError {
    fn from(err: ParseRegisterRequestError) -> Self {
        ApiError::UnprocessableEntity(err.to_string())
    }
}

/// Session payload shared by signup and login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthSessionResponseData {
    pub token: String,
    pub id: i64,
    pub username: String,
}

impl From<&AuthSession> for AuthSessionResponseData {
    fn from(session: &AuthSession) -> Self {
        Self {
            token: session.token.clone(),
            id: session.id.0,
            username: session.username.as_str().to_string(),
        }
    }
}

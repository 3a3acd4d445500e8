use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::register::AuthSessionResponseData;
use super::ApiError;
use super::ApiSuccess;
use super::INVALID_CREDENTIALS_MESSAGE;
use crate::domain::user::models::Credentials;
use crate::domain::user::models::Password;
use crate::domain::user::models::Username;
use crate::inbound::http::router::AppState;

/// Open a session for an existing user.
///
/// A username or password that fails validation cannot belong to any account,
/// so it is answered exactly like a wrong password.
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<ApiSuccess<AuthSessionResponseData>, ApiError> {
    let credentials = body.try_into_credentials().ok_or_else(|| {
        tracing::debug!("Login rejected: malformed credentials");
        ApiError::Unauthorized(INVALID_CREDENTIALS_MESSAGE.to_string())
    })?;

    state
        .auth_service
        .login(credentials)
        .await
        .map_err(ApiError::from)
        .map(|ref session| ApiSuccess::new(StatusCode::OK, session.into()))
}

/// HTTP request body for login (raw JSON)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginRequest {
    username: String,
    password: String,
}

impl LoginRequest {
    fn try_into_credentials(self) -> Option<Credentials> {
        let username = Username::new(self.username).ok()?;
        let password = Password::new(self.password).ok()?;
        Some(Credentials::new(username, password))
    }
}

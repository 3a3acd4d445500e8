use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use axum::Json;
use serde::Deserialize;

use super::ApiError;
use crate::domain::user::models::ChangePasswordCommand;
use crate::domain::user::models::Password;
use crate::inbound::http::middleware::AuthenticatedUser;
use crate::inbound::http::router::AppState;
use crate::user::errors::AuthError;

pub async fn update_password(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedUser>,
    Json(body): Json<UpdatePasswordRequest>,
) -> Result<StatusCode, ApiError> {
    state
        .auth_service
        .update_password(caller.user_id, body.try_into_command()?)
        .await
        .map_err(ApiError::from)?;

    Ok(StatusCode::NO_CONTENT)
}

/// HTTP request body for changing the caller's password (raw JSON)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UpdatePasswordRequest {
    old_password: String,
    new_password: String,
}

impl UpdatePasswordRequest {
    fn try_into_command(self) -> Result<ChangePasswordCommand, ApiError> {
        // An empty old password can never match the stored digest.
        let old_password = Password::new(self.old_password)
            .map_err(|_| ApiError::from(AuthError::InvalidCredentials))?;
        let new_password = Password::new(self.new_password)
            .map_err(|e| ApiError::UnprocessableEntity(format!("Invalid new password: {}", e)))?;
        Ok(ChangePasswordCommand {
            old_password,
            new_password,
        })
    }
}

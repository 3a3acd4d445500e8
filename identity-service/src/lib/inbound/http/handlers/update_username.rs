use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use axum::Json;
use serde::Deserialize;

use super::get_profile::ProfileResponseData;
use super::ApiError;
use super::ApiSuccess;
use crate::domain::user::models::Username;
use crate::inbound::http::middleware::AuthenticatedUser;
use crate::inbound::http::router::AppState;

/// Rename the caller. The target is always the id carried by the session token.
pub async fn update_username(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedUser>,
    Json(body): Json<UpdateUsernameRequest>,
) -> Result<ApiSuccess<ProfileResponseData>, ApiError> {
    let username = Username::new(body.username)
        .map_err(|e| ApiError::UnprocessableEntity(format!("Invalid username: {}", e)))?;

    state
        .auth_service
        .update_username(caller.user_id, username)
        .await
        .map_err(ApiError::from)
        .map(|ref profile| ApiSuccess::new(StatusCode::OK, profile.into()))
}

/// HTTP request body for renaming the caller (raw JSON)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UpdateUsernameRequest {
    username: String,
}

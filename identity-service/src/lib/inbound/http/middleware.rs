use auth::Authenticator;
use axum::extract::Request;
use axum::extract::State;
use axum::http::header;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;
use chrono::DateTime;
use chrono::Utc;
use thiserror::Error;

use crate::domain::user::models::UserId;
use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::router::AppState;

/// Body sent with every 401 produced here, whatever the underlying cause.
pub const UNAUTHORIZED_MESSAGE: &str = "Invalid or missing session token";

/// Extension type to store the authenticated caller in request extensions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: UserId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Unauthorized")]
pub struct Unauthorized;

/// Resolve a raw session token to the caller's id.
///
/// Purely computational: only the token codec is consulted, never the
/// credential store. The failure cause is logged and then collapsed so
/// clients cannot tell a forged token from an expired one.
pub fn authenticate_request(
    authenticator: &Authenticator,
    raw_token: &str,
    now: DateTime<Utc>,
) -> Result<UserId, Unauthorized> {
    authenticator
        .validate_token(raw_token, now)
        .map(UserId)
        .map_err(|e| {
            tracing::warn!(reason = e.kind(), "Session token rejected");
            Unauthorized
        })
}

/// Middleware that validates the bearer token and adds the caller to request extensions
pub async fn require_identity(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(req.headers()).ok_or_else(|| {
        tracing::warn!(reason = "missing_token", "Session token rejected");
        unauthorized()
    })?;

    let user_id =
        authenticate_request(&state.authenticator, token, Utc::now()).map_err(|_| unauthorized())?;

    req.extensions_mut().insert(AuthenticatedUser { user_id });

    Ok(next.run(req).await)
}

fn unauthorized() -> ApiError {
    ApiError::Unauthorized(UNAUTHORIZED_MESSAGE.to_string())
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("Bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use auth::HashingParams;
    use auth::PasswordHasher;
    use auth::SigningKey;
    use auth::TokenCodec;
    use axum::body::Body;
    use axum::http::Request;
    use axum::http::StatusCode;
    use http_body_util::BodyExt;
    use mockall::mock;
    use mockall::predicate::eq;
    use tower::ServiceExt;

    use super::*;
    use crate::domain::user::models::AuthSession;
    use crate::domain::user::models::ChangePasswordCommand;
    use crate::domain::user::models::Credentials;
    use crate::domain::user::models::Profile;
    use crate::domain::user::models::Username;
    use crate::domain::user::ports::AuthServicePort;
    use crate::inbound::http::router::create_router;
    use crate::user::errors::AuthError;

    mock! {
        pub TestAuthService {}

        #[async_trait]
        impl AuthServicePort for TestAuthService {
            async fn register(&self, credentials: Credentials) -> Result<AuthSession, AuthError>;
            async fn login(&self, credentials: Credentials) -> Result<AuthSession, AuthError>;
            async fn get_profile(&self, id: UserId) -> Result<Profile, AuthError>;
            async fn update_username(&self, id: UserId, username: Username) -> Result<Profile, AuthError>;
            async fn update_password(&self, id: UserId, command: ChangePasswordCommand) -> Result<(), AuthError>;
        }
    }

    fn authenticator(secret: &str) -> Arc<Authenticator> {
        let hasher = PasswordHasher::with_params(HashingParams {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        })
        .unwrap();
        let key = SigningKey::new(secret).unwrap();
        let codec = TokenCodec::new(&key, chrono::Duration::hours(24));
        Arc::new(Authenticator::new(hasher, codec).unwrap())
    }

    async fn send(
        service: MockTestAuthService,
        authenticator: Arc<Authenticator>,
        authorization: Option<String>,
    ) -> (StatusCode, serde_json::Value) {
        let app = create_router(Arc::new(service), authenticator, Duration::from_secs(5));
        let mut builder = Request::builder().uri("/api/profile");
        if let Some(value) = authorization {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        let response = app
            .oneshot(builder.body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn test_authenticate_request_resolves_user_id() {
        let authenticator = authenticator("test-secret");
        let now = Utc::now();
        let token = authenticator.issue_token(7, now).unwrap();

        assert_eq!(
            authenticate_request(&authenticator, &token, now),
            Ok(UserId(7))
        );
    }

    #[test]
    fn test_authenticate_request_rejects_bad_tokens() {
        let authenticator = authenticator("test-secret");
        let now = Utc::now();
        let token = authenticator.issue_token(7, now).unwrap();
        let expired_at = now + chrono::Duration::hours(24);

        assert_eq!(
            authenticate_request(&authenticator, &token, expired_at),
            Err(Unauthorized)
        );
        assert_eq!(
            authenticate_request(&authenticator, "not-a-token", now),
            Err(Unauthorized)
        );
        assert_eq!(
            authenticate_request(&authenticator, "", now),
            Err(Unauthorized)
        );
    }

    #[test]
    fn test_bearer_token_parsing() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, "Bearer abc.def.ghi".parse().unwrap());
        assert_eq!(bearer_token(&headers), Some("abc.def.ghi"));

        headers.insert(header::AUTHORIZATION, "bearer abc".parse().unwrap());
        assert_eq!(bearer_token(&headers), Some("abc"));

        headers.insert(header::AUTHORIZATION, "Basic abc".parse().unwrap());
        assert_eq!(bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, "Bearer ".parse().unwrap());
        assert_eq!(bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, "abc.def.ghi".parse().unwrap());
        assert_eq!(bearer_token(&headers), None);
    }

    #[tokio::test]
    async fn test_valid_token_reaches_handler_with_caller_id() {
        let authenticator = authenticator("test-secret");
        let token = authenticator.issue_token(42, Utc::now()).unwrap();

        let mut service = MockTestAuthService::new();
        service
            .expect_get_profile()
            .with(eq(UserId(42)))
            .times(1)
            .returning(|id| {
                Ok(Profile {
                    id,
                    username: Username::new("carol".to_string()).unwrap(),
                })
            });

        let (status, body) = send(service, authenticator, Some(format!("Bearer {}", token))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["id"], 42);
        assert_eq!(body["data"]["username"], "carol");
    }

    #[tokio::test]
    async fn test_rejections_are_uniform_and_skip_the_service() {
        let authenticator = authenticator("test-secret");
        let now = Utc::now();
        let valid = authenticator.issue_token(42, now).unwrap();
        let foreign = self::authenticator("other-secret")
            .issue_token(42, now)
            .unwrap();
        let expired = {
            let past = now - chrono::Duration::hours(25);
            authenticator.issue_token(42, past).unwrap()
        };
        let mut tampered = valid.clone().into_bytes();
        let last = tampered.len() - 1;
        tampered[last] = if tampered[last] == b'A' { b'B' } else { b'A' };
        let tampered = String::from_utf8(tampered).unwrap();

        let cases = [
            None,
            Some("Bearer".to_string()),
            Some(format!("Token {}", valid)),
            Some("Bearer garbage".to_string()),
            Some(format!("Bearer {}", foreign)),
            Some(format!("Bearer {}", expired)),
            Some(format!("Bearer {}", tampered)),
        ];

        let mut bodies = Vec::new();
        for authorization in cases {
            // No expectations: any call into the service panics.
            let service = MockTestAuthService::new();
            let (status, body) = send(service, Arc::clone(&authenticator), authorization).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED);
            bodies.push(body);
        }

        assert!(bodies.windows(2).all(|pair| pair[0] == pair[1]));
        assert_eq!(bodies[0]["data"]["message"], UNAUTHORIZED_MESSAGE);
        assert_eq!(bodies[0]["data"]["code"], "unauthorized");
    }
}

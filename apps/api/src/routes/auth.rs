//! Auth routes and the bearer token gate.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::{header, StatusCode};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};

use super::AppJson;
use crate::auth::extract_bearer_token;
use crate::error::{ApiError, ApiResult, AuthError};
use crate::services::auth_service::AuthResponse;
use crate::AppState;

/// Identity attached to requests that passed [`require_auth`].
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: String,
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

pub fn routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route(
            "/api/auth/me",
            get(me).route_layer(middleware::from_fn_with_state(state, require_auth)),
        )
}

/// Rejects requests without a valid bearer token.
///
/// Missing header → 401 `Access token required`; bad or expired token →
/// 403 `Invalid or expired token`.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(extract_bearer_token)
        .ok_or(AuthError::MissingToken)?;

    let claims = state.auth.verify(token)?;

    request.extensions_mut().insert(AuthUser {
        id: claims.sub,
        email: claims.email,
    });

    Ok(next.run(request).await)
}

/// Only absent or empty strings count as missing; whitespace is a value.
fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

async fn register(
    State(state): State<Arc<AppState>>,
    AppJson(body): AppJson<RegisterRequest>,
) -> ApiResult<(StatusCode, AppJson<AuthResponse>)> {
    let (Some(email), Some(password), Some(name)) = (
        present(&body.email),
        present(&body.password),
        present(&body.name),
    ) else {
        return Err(ApiError::validation("Email, password, and name are required"));
    };

    let response = state.auth.register(email, password, name).await?;
    Ok((StatusCode::CREATED, AppJson(response)))
}

async fn login(
    State(state): State<Arc<AppState>>,
    AppJson(body): AppJson<LoginRequest>,
) -> ApiResult<AppJson<AuthResponse>> {
    let (Some(email), Some(password)) = (present(&body.email), present(&body.password)) else {
        return Err(ApiError::validation("Email and password are required"));
    };

    Ok(AppJson(state.auth.login(email, password).await?))
}

async fn me(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Json<Value>> {
    let user = state.auth.current_user(&user.id).await?;
    Ok(Json(json!({ "user": user })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_present_only_rejects_missing_or_empty() {
        assert_eq!(present(&None), None);
        assert_eq!(present(&Some(String::new())), None);
        assert_eq!(present(&Some("      ".to_string())), Some("      "));
        assert_eq!(present(&Some("admin123".to_string())), Some("admin123"));
    }
}

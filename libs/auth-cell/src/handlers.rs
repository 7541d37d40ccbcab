use std::sync::Arc;

use axum::{
    extract::{Json, State},
    http::HeaderMap,
};
use axum_extra::TypedHeader;
use headers::{authorization::Bearer, Authorization};
use serde_json::{json, Value};
use tracing::debug;

use shared_config::AppConfig;
use shared_models::auth::TokenResponse;
use shared_models::error::AppError;
use shared_utils::jwt;

use crate::models::{AuthError, LoginRequest};
use crate::services::SessionService;

fn extract_bearer_token(headers: &HeaderMap) -> Result<String, AppError> {
    let auth_header = headers
        .get("Authorization")
        .ok_or_else(|| AppError::Auth("Missing authorization header".to_string()))?;

    let auth_value = auth_header
        .to_str()
        .map_err(|_| AppError::Auth("Invalid authorization header format".to_string()))?;

    let token = auth_value
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::Auth("Invalid authorization header format".to_string()))?;

    Ok(token.to_string())
}

fn map_auth_error(err: AuthError) -> AppError {
    match err {
        AuthError::InvalidCredentials => AppError::Auth("Invalid credentials".to_string()),
        AuthError::AccountDisabled => AppError::DisabledAccount("Disabled account".to_string()),
        AuthError::Provider(msg) => AppError::ExternalService(msg),
    }
}

async fn login(config: &AppConfig, request: LoginRequest) -> Result<Json<Value>, AppError> {
    let service = SessionService::new(config);

    let session = service
        .login(&request.email, &request.password)
        .await
        .map_err(map_auth_error)?;

    Ok(Json(json!({
        "token": session.access_token,
        "token_type": session.token_type,
        "expires_in": session.expires_in,
        "refresh_token": session.refresh_token,
        "user_id": session.user.id,
    })))
}

/// Doctor and patient logins are behaviorally identical; both routes exist
/// for surface parity with the clients.
#[axum::debug_handler]
pub async fn login_doctor(
    State(config): State<Arc<AppConfig>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<Value>, AppError> {
    debug!("Doctor login for {}", request.email);
    login(&config, request).await
}

#[axum::debug_handler]
pub async fn login_user(
    State(config): State<Arc<AppConfig>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<Value>, AppError> {
    debug!("Patient login for {}", request.email);
    login(&config, request).await
}

#[axum::debug_handler]
pub async fn logout(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
) -> Result<Json<Value>, AppError> {
    let service = SessionService::new(&config);

    service.logout(auth.token()).await.map_err(map_auth_error)?;

    Ok(Json(json!({ "success": true })))
}

/// Token introspection for clients that want to check a stored token.
pub async fn validate_token(
    State(config): State<Arc<AppConfig>>,
    headers: HeaderMap,
) -> Result<Json<TokenResponse>, AppError> {
    debug!("Validating token");

    let token = extract_bearer_token(&headers)?;

    match jwt::validate_token(&token, &config.supabase_jwt_secret) {
        Ok(user) => Ok(Json(TokenResponse {
            valid: true,
            user_id: user.id,
            email: user.email,
            role: user.role,
        })),
        Err(err) => Err(AppError::Auth(err)),
    }
}

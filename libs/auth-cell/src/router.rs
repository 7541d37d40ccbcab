use std::sync::Arc;

use axum::{
    middleware,
    routing::post,
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

/// Mounted at `/login` by the API crate.
pub fn login_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/doctor", post(handlers::login_doctor))
        .route("/user", post(handlers::login_user))
        .route("/validate", post(handlers::validate_token))
        .with_state(state)
}

/// Mounted at `/logout` by the API crate.
pub fn logout_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", post(handlers::logout))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}

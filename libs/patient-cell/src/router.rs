use std::sync::Arc;

use axum::{middleware, routing::post, Router};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

/// Mounted at `/register` by the API crate (the original surface names the
/// patient route `user`).
pub fn registration_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/user", post(handlers::register_patient))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}

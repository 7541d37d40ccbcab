use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

/// Mounted at `/messages` by the API crate. Both create routes exist for
/// client compatibility.
pub fn message_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", get(handlers::list_messages).post(handlers::create_message))
        .route("/create", post(handlers::create_message))
        .route("/conversations", post(handlers::get_or_create_conversation))
        .route(
            "/conversations/{conversation_id}",
            get(handlers::list_conversation_messages),
        )
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}

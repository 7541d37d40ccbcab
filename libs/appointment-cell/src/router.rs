use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

/// Mounted at `/appointments` by the API crate. Every operation requires an
/// authenticated caller.
pub fn appointment_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", post(handlers::book_appointment))
        .route("/ordered", get(handlers::get_all_appointments_ordered))
        .route("/{appointment_id}", get(handlers::get_appointment))
        .route("/{appointment_id}/confirm", put(handlers::confirm_appointment))
        .route("/{appointment_id}/complete", put(handlers::complete_appointment))
        .route("/{appointment_id}/cancel", put(handlers::cancel_appointment))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}

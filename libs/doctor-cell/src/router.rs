use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

/// Mounted at `/doctors` by the API crate. The directory listing and the
/// reference-data lookups are public; detail lookup requires a caller.
pub fn doctor_routes(state: Arc<AppConfig>) -> Router {
    let public_routes = Router::new()
        .route("/", get(handlers::list_doctors))
        .route("/specializations", get(handlers::list_specializations))
        .route("/qualifications", get(handlers::list_qualifications));

    let protected_routes = Router::new()
        .route("/{doctor_id}", get(handlers::get_doctor))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}

/// Mounted at `/register` by the API crate.
pub fn registration_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/doctor", post(handlers::register_doctor))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}

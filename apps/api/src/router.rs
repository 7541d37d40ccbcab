use std::sync::Arc;

use axum::{routing::get, Router};

use appointment_cell::router::appointment_routes;
use auth_cell::router::{login_routes, logout_routes};
use doctor_cell::router::doctor_routes;
use medical_record_cell::router::medical_record_routes;
use messaging_cell::router::message_routes;
use shared_config::AppConfig;

pub fn create_router(state: Arc<AppConfig>) -> Router {
    let registration = Router::new()
        .merge(doctor_cell::router::registration_routes(state.clone()))
        .merge(patient_cell::router::registration_routes(state.clone()));

    Router::new()
        .route("/", get(|| async { "Clinic API is running!" }))
        .nest("/register", registration)
        .nest("/login", login_routes(state.clone()))
        .nest("/logout", logout_routes(state.clone()))
        .nest("/doctors", doctor_routes(state.clone()))
        .nest("/appointments", appointment_routes(state.clone()))
        .nest("/records", medical_record_routes(state.clone()))
        .nest("/messages", message_routes(state))
}

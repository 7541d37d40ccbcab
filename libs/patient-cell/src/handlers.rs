use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use axum_extra::TypedHeader;
use headers::{authorization::Bearer, Authorization};
use serde_json::{json, Value};

use shared_config::AppConfig;
use shared_models::error::AppError;

use crate::models::{RegisterPatientRequest, RegistrationError};
use crate::services::PatientRegistrationService;

fn map_registration_error(err: RegistrationError) -> AppError {
    match err {
        RegistrationError::Validation(errors) => AppError::Validation(errors),
        RegistrationError::ProfileExists(msg) => AppError::Conflict(msg),
        RegistrationError::Identity(msg) => AppError::ExternalService(msg),
        RegistrationError::Database(msg) => AppError::Database(msg),
    }
}

#[axum::debug_handler]
pub async fn register_patient(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Json(request): Json<RegisterPatientRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let service = PatientRegistrationService::new(&config);

    let patient = service
        .register(request, auth.token())
        .await
        .map_err(map_registration_error)?;

    Ok((StatusCode::CREATED, Json(json!(patient))))
}

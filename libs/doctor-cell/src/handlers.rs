use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use axum_extra::TypedHeader;
use headers::{authorization::Bearer, Authorization};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::error::AppError;

use crate::models::{DoctorError, RegisterDoctorRequest, RegistrationError};
use crate::services::{DoctorDirectoryService, DoctorRegistrationService};

fn map_registration_error(err: RegistrationError) -> AppError {
    match err {
        RegistrationError::Validation(errors) => AppError::Validation(errors),
        RegistrationError::ProfileExists(msg) => AppError::Conflict(msg),
        RegistrationError::Identity(msg) => AppError::ExternalService(msg),
        RegistrationError::Database(msg) => AppError::Database(msg),
    }
}

#[axum::debug_handler]
pub async fn register_doctor(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Json(request): Json<RegisterDoctorRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let service = DoctorRegistrationService::new(&config);

    let doctor = service
        .register(request, auth.token())
        .await
        .map_err(map_registration_error)?;

    Ok((StatusCode::CREATED, Json(json!(doctor))))
}

#[axum::debug_handler]
pub async fn list_doctors(
    State(config): State<Arc<AppConfig>>,
) -> Result<Json<Value>, AppError> {
    let service = DoctorDirectoryService::new(&config);

    let doctors = service
        .list_doctors()
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    Ok(Json(json!(doctors)))
}

#[axum::debug_handler]
pub async fn get_doctor(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Path(doctor_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = DoctorDirectoryService::new(&config);

    let doctor = service
        .get_doctor(doctor_id, auth.token())
        .await
        .map_err(|e| match e {
            DoctorError::NotFound => AppError::NotFound("Doctor not found".to_string()),
            DoctorError::Database(msg) => AppError::Database(msg),
        })?;

    let image_url = service.image_url(&doctor);

    let mut body = json!(doctor);
    body["image_url"] = json!(image_url);

    Ok(Json(body))
}

#[axum::debug_handler]
pub async fn list_specializations(
    State(config): State<Arc<AppConfig>>,
) -> Result<Json<Value>, AppError> {
    let service = DoctorDirectoryService::new(&config);

    let specializations = service
        .list_specializations()
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    Ok(Json(json!(specializations)))
}

#[axum::debug_handler]
pub async fn list_qualifications(
    State(config): State<Arc<AppConfig>>,
) -> Result<Json<Value>, AppError> {
    let service = DoctorDirectoryService::new(&config);

    let qualifications = service
        .list_qualifications()
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    Ok(Json(json!(qualifications)))
}

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

use crate::models::{CreateMedicalRecordRequest, MedicalRecordError};
use crate::services::records::{validate, MedicalRecordService};

fn map_record_error(err: MedicalRecordError) -> AppError {
    match err {
        MedicalRecordError::DoctorNotFound => AppError::NotFound("Doctor not found".to_string()),
        MedicalRecordError::PatientNotFound => AppError::NotFound("Patient not found".to_string()),
        MedicalRecordError::Database(msg) => AppError::Database(msg),
    }
}

#[axum::debug_handler]
pub async fn create_record(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Json(request): Json<CreateMedicalRecordRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    validate(&request).map_err(AppError::Validation)?;

    let service = MedicalRecordService::new(&config);

    let record = service
        .create_record(request, auth.token())
        .await
        .map_err(map_record_error)?;

    Ok((StatusCode::CREATED, Json(json!(record))))
}

#[axum::debug_handler]
pub async fn list_patient_records(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Path(patient_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = MedicalRecordService::new(&config);

    let records = service
        .list_for_patient(patient_id, auth.token())
        .await
        .map_err(map_record_error)?;

    Ok(Json(json!(records)))
}

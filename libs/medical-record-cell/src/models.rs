use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Append-only clinical note. Rows are never edited or deleted; created_at
/// is assigned at insert time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MedicalRecord {
    pub id: Uuid,
    pub doctor_id: Uuid,
    pub patient_id: Uuid,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateMedicalRecordRequest {
    pub doctor_id: Uuid,
    pub patient_id: Uuid,
    pub description: String,
}

#[derive(Debug, thiserror::Error)]
pub enum MedicalRecordError {
    #[error("Doctor not found")]
    DoctorNotFound,

    #[error("Patient not found")]
    PatientNotFound,

    #[error("Database error: {0}")]
    Database(String),
}

use chrono::Utc;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::SupabaseClient;
use shared_models::validation::FieldErrors;

use crate::models::{CreateMedicalRecordRequest, MedicalRecord, MedicalRecordError};

pub struct MedicalRecordService {
    supabase: SupabaseClient,
}

impl MedicalRecordService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    /// Append a note. The referenced doctor and patient must exist; nothing
    /// about an existing record is ever mutated.
    pub async fn create_record(
        &self,
        request: CreateMedicalRecordRequest,
        auth_token: &str,
    ) -> Result<MedicalRecord, MedicalRecordError> {
        debug!(
            "Creating medical record by doctor {} for patient {}",
            request.doctor_id, request.patient_id
        );

        if !self.ensure_exists("doctors", request.doctor_id, auth_token).await? {
            return Err(MedicalRecordError::DoctorNotFound);
        }
        if !self.ensure_exists("patients", request.patient_id, auth_token).await? {
            return Err(MedicalRecordError::PatientNotFound);
        }

        let record_data = json!({
            "doctor_id": request.doctor_id,
            "patient_id": request.patient_id,
            "description": request.description,
            "created_at": Utc::now().to_rfc3339(),
        });

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            "Prefer",
            reqwest::header::HeaderValue::from_static("return=representation"),
        );

        let inserted: Vec<Value> = self
            .supabase
            .request_with_headers(
                Method::POST,
                "/rest/v1/medical_records",
                Some(auth_token),
                Some(record_data),
                Some(headers),
            )
            .await
            .map_err(|e| MedicalRecordError::Database(e.to_string()))?;

        let row = inserted
            .into_iter()
            .next()
            .ok_or_else(|| MedicalRecordError::Database("Insert returned no row".to_string()))?;

        serde_json::from_value(row)
            .map_err(|e| MedicalRecordError::Database(format!("Failed to parse record: {}", e)))
    }

    /// A patient's notes, newest first.
    pub async fn list_for_patient(
        &self,
        patient_id: Uuid,
        auth_token: &str,
    ) -> Result<Vec<MedicalRecord>, MedicalRecordError> {
        debug!("Listing medical records for patient {}", patient_id);

        let path = format!(
            "/rest/v1/medical_records?patient_id=eq.{}&order=created_at.desc",
            patient_id
        );

        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await
            .map_err(|e| MedicalRecordError::Database(e.to_string()))?;

        result
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<MedicalRecord>, _>>()
            .map_err(|e| MedicalRecordError::Database(format!("Failed to parse records: {}", e)))
    }

    async fn ensure_exists(
        &self,
        table: &str,
        id: Uuid,
        auth_token: &str,
    ) -> Result<bool, MedicalRecordError> {
        let path = format!("/rest/v1/{}?id=eq.{}&select=id", table, id);

        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await
            .map_err(|e| MedicalRecordError::Database(e.to_string()))?;

        Ok(!result.is_empty())
    }
}

pub fn validate(request: &CreateMedicalRecordRequest) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();

    if request.description.trim().is_empty() {
        errors.add("description", "must not be empty");
    }

    errors.into_result()
}

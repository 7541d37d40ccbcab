use reqwest::Method;
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::SupabaseClient;

use crate::models::{Doctor, DoctorError, Qualification, Specialization};

pub struct DoctorDirectoryService {
    supabase: SupabaseClient,
}

impl DoctorDirectoryService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    /// Public directory listing: active doctors only, sorted by name.
    pub async fn list_doctors(&self) -> Result<Vec<Doctor>, DoctorError> {
        debug!("Listing active doctors");

        let path = "/rest/v1/doctors?is_active=eq.true&order=name.asc";
        let doctors: Vec<Doctor> = self
            .supabase
            .request(Method::GET, path, None, None)
            .await
            .map_err(|e| DoctorError::Database(e.to_string()))?;

        Ok(doctors)
    }

    pub async fn get_doctor(
        &self,
        doctor_id: Uuid,
        auth_token: &str,
    ) -> Result<Doctor, DoctorError> {
        debug!("Fetching doctor profile: {}", doctor_id);

        let path = format!("/rest/v1/doctors?id=eq.{}", doctor_id);
        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await
            .map_err(|e| DoctorError::Database(e.to_string()))?;

        let row = result.into_iter().next().ok_or(DoctorError::NotFound)?;
        let doctor = serde_json::from_value(row)
            .map_err(|e| DoctorError::Database(format!("Failed to parse doctor: {}", e)))?;

        Ok(doctor)
    }

    pub async fn list_specializations(&self) -> Result<Vec<Specialization>, DoctorError> {
        let path = "/rest/v1/specializations?order=name.asc";
        self.supabase
            .request(Method::GET, path, None, None)
            .await
            .map_err(|e| DoctorError::Database(e.to_string()))
    }

    pub async fn list_qualifications(&self) -> Result<Vec<Qualification>, DoctorError> {
        let path = "/rest/v1/qualifications?order=name.asc";
        self.supabase
            .request(Method::GET, path, None, None)
            .await
            .map_err(|e| DoctorError::Database(e.to_string()))
    }

    /// Public URL for a doctor's stored image, when one was uploaded.
    pub fn image_url(&self, doctor: &Doctor) -> Option<String> {
        doctor
            .image_path
            .as_deref()
            .map(|path| self.supabase.get_public_url(path))
    }
}

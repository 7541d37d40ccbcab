use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use auth_cell::models::AccountCredentials;
use shared_models::validation::FieldErrors;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Doctor {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
    pub office_number: String,
    pub specialization: String,
    pub qualifications: Vec<String>,
    pub years_of_experience: i32,
    pub image_path: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Named lookup entities referenced by doctor profiles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Specialization {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Qualification {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterDoctorRequest {
    pub user: AccountCredentials,
    pub name: String,
    pub email: String,
    pub office_number: String,
    pub specialization: String,
    #[serde(default)]
    pub qualifications: Vec<String>,
    pub years_of_experience: i32,
    pub image_path: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum DoctorError {
    #[error("Doctor not found")]
    NotFound,

    #[error("Database error: {0}")]
    Database(String),
}

#[derive(Debug, thiserror::Error)]
pub enum RegistrationError {
    #[error("{0}")]
    Validation(FieldErrors),

    #[error("Profile already exists: {0}")]
    ProfileExists(String),

    #[error("Identity provider error: {0}")]
    Identity(String),

    #[error("Database error: {0}")]
    Database(String),
}

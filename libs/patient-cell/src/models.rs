use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use auth_cell::models::AccountCredentials;
use shared_models::validation::FieldErrors;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Patient {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub date_of_birth: NaiveDate,
    pub gender: Gender,
    pub phone_number: String,
    pub email: Option<String>,
    pub age: i32,
    pub blood_group: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    #[serde(rename = "M")]
    Male,
    #[serde(rename = "F")]
    Female,
    #[serde(rename = "O")]
    Other,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterPatientRequest {
    pub user: AccountCredentials,
    pub name: String,
    pub date_of_birth: NaiveDate,
    pub gender: Gender,
    pub phone_number: String,
    pub email: Option<String>,
    pub age: i32,
    pub blood_group: String,
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

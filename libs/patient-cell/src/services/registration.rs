use std::sync::LazyLock;

use chrono::Utc;
use regex::Regex;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, warn};

use auth_cell::models::IdentityError;
use auth_cell::services::IdentityService;
use shared_config::AppConfig;
use shared_database::{SupabaseClient, SupabaseError};
use shared_models::validation::{is_valid_email, FieldErrors};

use crate::models::{Patient, RegisterPatientRequest, RegistrationError};

static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{10}$").unwrap());

pub struct PatientRegistrationService {
    supabase: SupabaseClient,
    identity: IdentityService,
}

impl PatientRegistrationService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
            identity: IdentityService::new(config),
        }
    }

    /// Identity first, then the profile row; the identity is rolled back if
    /// the profile insert fails.
    pub async fn register(
        &self,
        request: RegisterPatientRequest,
        auth_token: &str,
    ) -> Result<Patient, RegistrationError> {
        debug!("Registering patient profile for {}", request.user.email);

        validate(&request).map_err(RegistrationError::Validation)?;

        let account = self
            .identity
            .create_identity(&request.user, "patient")
            .await
            .map_err(map_identity_error)?;

        let patient_data = json!({
            "user_id": account.id,
            "name": request.name,
            "date_of_birth": request.date_of_birth.format("%Y-%m-%d").to_string(),
            "gender": request.gender,
            "phone_number": request.phone_number,
            "email": request.email,
            "age": request.age,
            "blood_group": request.blood_group,
            "is_active": true,
            "created_at": Utc::now().to_rfc3339(),
            "updated_at": Utc::now().to_rfc3339(),
        });

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            "Prefer",
            reqwest::header::HeaderValue::from_static("return=representation"),
        );

        let inserted: Result<Vec<Value>, SupabaseError> = self
            .supabase
            .request_with_headers(
                Method::POST,
                "/rest/v1/patients",
                Some(auth_token),
                Some(patient_data),
                Some(headers),
            )
            .await;

        let row = match inserted {
            Ok(mut rows) if !rows.is_empty() => rows.remove(0),
            Ok(_) => {
                warn!("Patient insert returned no row, rolling back identity {}", account.id);
                self.identity.delete_identity(account.id).await;
                return Err(RegistrationError::Database(
                    "Failed to create patient profile".to_string(),
                ));
            }
            Err(e) => {
                warn!("Patient insert failed, rolling back identity {}", account.id);
                self.identity.delete_identity(account.id).await;
                return Err(match e {
                    SupabaseError::Conflict(msg) => RegistrationError::ProfileExists(msg),
                    other => RegistrationError::Database(other.to_string()),
                });
            }
        };

        let patient: Patient = serde_json::from_value(row)
            .map_err(|e| RegistrationError::Database(format!("Failed to parse patient: {}", e)))?;

        debug!("Patient profile created with ID: {}", patient.id);
        Ok(patient)
    }
}

fn validate(request: &RegisterPatientRequest) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();

    if request.name.trim().is_empty() {
        errors.add("name", "must not be empty");
    }
    if !PHONE_RE.is_match(&request.phone_number) {
        errors.add("phone_number", "Phone number must be 10 digits long.");
    }
    if let Some(email) = &request.email {
        if !is_valid_email(email) {
            errors.add("email", "must be a valid email address");
        }
    }
    if request.age < 0 {
        errors.add("age", "must not be negative");
    }
    if request.blood_group.trim().is_empty() {
        errors.add("blood_group", "must not be empty");
    }
    if !is_valid_email(&request.user.email) {
        errors.add("user.email", "must be a valid email address");
    }
    if request.user.password.len() < 8 {
        errors.add("user.password", "must be at least 8 characters");
    }
    if request.user.username.trim().is_empty() {
        errors.add("user.username", "must not be empty");
    }

    errors.into_result()
}

fn map_identity_error(err: IdentityError) -> RegistrationError {
    match err {
        IdentityError::EmailTaken => {
            let mut errors = FieldErrors::new();
            errors.add("user.email", "an account with this email already exists");
            RegistrationError::Validation(errors)
        }
        IdentityError::Provider(msg) => RegistrationError::Identity(msg),
    }
}

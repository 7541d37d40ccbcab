use chrono::Utc;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, warn};

use auth_cell::models::IdentityError;
use auth_cell::services::IdentityService;
use shared_config::AppConfig;
use shared_database::{SupabaseClient, SupabaseError};
use shared_models::validation::{is_valid_email, FieldErrors};

use crate::models::{Doctor, RegisterDoctorRequest, RegistrationError};

pub struct DoctorRegistrationService {
    supabase: SupabaseClient,
    identity: IdentityService,
}

impl DoctorRegistrationService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
            identity: IdentityService::new(config),
        }
    }

    /// Create the account identity, then the doctor profile bound to it.
    /// The identity is rolled back if the profile insert fails, so a failed
    /// registration never leaves an orphaned login.
    pub async fn register(
        &self,
        request: RegisterDoctorRequest,
        auth_token: &str,
    ) -> Result<Doctor, RegistrationError> {
        debug!("Registering doctor profile for {}", request.email);

        validate(&request).map_err(RegistrationError::Validation)?;

        // A profile pre-check keeps the common duplicate case from touching
        // the identity provider at all.
        let existing_check_path = format!(
            "/rest/v1/doctors?email=eq.{}&select=id",
            urlencoding::encode(&request.email)
        );
        let existing: Vec<Value> = self
            .supabase
            .request(Method::GET, &existing_check_path, Some(auth_token), None)
            .await
            .map_err(|e| RegistrationError::Database(e.to_string()))?;

        if !existing.is_empty() {
            return Err(RegistrationError::ProfileExists(format!(
                "Doctor with email {} already exists",
                request.email
            )));
        }

        let account = self
            .identity
            .create_identity(&request.user, "doctor")
            .await
            .map_err(map_identity_error)?;

        let doctor_data = json!({
            "user_id": account.id,
            "name": request.name,
            "email": request.email,
            "office_number": request.office_number,
            "specialization": request.specialization,
            "qualifications": request.qualifications,
            "years_of_experience": request.years_of_experience,
            "image_path": request.image_path,
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
                "/rest/v1/doctors",
                Some(auth_token),
                Some(doctor_data),
                Some(headers),
            )
            .await;

        let row = match inserted {
            Ok(mut rows) if !rows.is_empty() => rows.remove(0),
            Ok(_) => {
                warn!("Doctor insert returned no row, rolling back identity {}", account.id);
                self.identity.delete_identity(account.id).await;
                return Err(RegistrationError::Database(
                    "Failed to create doctor profile".to_string(),
                ));
            }
            Err(e) => {
                warn!("Doctor insert failed, rolling back identity {}", account.id);
                self.identity.delete_identity(account.id).await;
                return Err(match e {
                    SupabaseError::Conflict(msg) => RegistrationError::ProfileExists(msg),
                    other => RegistrationError::Database(other.to_string()),
                });
            }
        };

        let doctor: Doctor = serde_json::from_value(row)
            .map_err(|e| RegistrationError::Database(format!("Failed to parse doctor: {}", e)))?;

        debug!("Doctor profile created with ID: {}", doctor.id);
        Ok(doctor)
    }
}

fn validate(request: &RegisterDoctorRequest) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();

    if request.name.trim().is_empty() {
        errors.add("name", "must not be empty");
    }
    if !is_valid_email(&request.email) {
        errors.add("email", "must be a valid email address");
    }
    if request.office_number.trim().is_empty() {
        errors.add("office_number", "must not be empty");
    }
    if request.specialization.trim().is_empty() {
        errors.add("specialization", "must not be empty");
    }
    if request.years_of_experience < 0 {
        errors.add("years_of_experience", "must not be negative");
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

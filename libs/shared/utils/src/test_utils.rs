use std::sync::Arc;

use base64::{engine::general_purpose, Engine as _};
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use serde_json::json;
use sha2::Sha256;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::User;

pub struct TestConfig {
    pub jwt_secret: String,
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub supabase_service_role_key: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "test-secret-key-for-jwt-validation-must-be-long-enough".to_string(),
            supabase_url: "http://localhost:54321".to_string(),
            supabase_anon_key: "test-anon-key".to_string(),
            supabase_service_role_key: "test-service-role-key".to_string(),
        }
    }
}

impl TestConfig {
    /// Point the config at a wiremock server.
    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            supabase_url: base_url.to_string(),
            ..Self::default()
        }
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            supabase_url: self.supabase_url.clone(),
            supabase_anon_key: self.supabase_anon_key.clone(),
            supabase_service_role_key: self.supabase_service_role_key.clone(),
            supabase_jwt_secret: self.jwt_secret.clone(),
        }
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }
}

pub struct TestUser {
    pub id: String,
    pub email: String,
    pub role: String,
}

impl Default for TestUser {
    fn default() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email: "test@example.com".to_string(),
            role: "patient".to_string(),
        }
    }
}

impl TestUser {
    pub fn new(email: &str, role: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            role: role.to_string(),
        }
    }

    pub fn doctor(email: &str) -> Self {
        Self::new(email, "doctor")
    }

    pub fn patient(email: &str) -> Self {
        Self::new(email, "patient")
    }

    pub fn to_user(&self) -> User {
        User {
            id: self.id.clone(),
            email: Some(self.email.clone()),
            role: Some(self.role.clone()),
            metadata: None,
            created_at: Some(Utc::now()),
        }
    }
}

pub struct JwtTestUtils;

impl JwtTestUtils {
    pub fn create_test_token(user: &TestUser, secret: &str, exp_hours: Option<i64>) -> String {
        let now = Utc::now();
        let exp = now + Duration::hours(exp_hours.unwrap_or(24));

        let header = json!({
            "alg": "HS256",
            "typ": "JWT"
        });

        let payload = json!({
            "sub": user.id,
            "email": user.email,
            "role": user.role,
            "iat": now.timestamp(),
            "exp": exp.timestamp()
        });

        let header_encoded = general_purpose::URL_SAFE_NO_PAD.encode(header.to_string());
        let payload_encoded = general_purpose::URL_SAFE_NO_PAD.encode(payload.to_string());

        let signing_input = format!("{}.{}", header_encoded, payload_encoded);

        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(signing_input.as_bytes());
        let signature = mac.finalize().into_bytes();
        let signature_encoded = general_purpose::URL_SAFE_NO_PAD.encode(signature);

        format!("{}.{}", signing_input, signature_encoded)
    }

    pub fn create_expired_token(user: &TestUser, secret: &str) -> String {
        Self::create_test_token(user, secret, Some(-1))
    }

    pub fn create_invalid_signature_token(user: &TestUser) -> String {
        Self::create_test_token(user, "wrong-secret", Some(24))
    }

    pub fn create_malformed_token() -> String {
        "invalid.token.format".to_string()
    }
}

/// Canned PostgREST rows matching the clinic schema, for wiremock responses.
pub struct MockClinicRows;

impl MockClinicRows {
    pub fn doctor_row(id: &str, user_id: &str, name: &str) -> serde_json::Value {
        json!({
            "id": id,
            "user_id": user_id,
            "name": name,
            "email": "doctor@example.com",
            "office_number": "204B",
            "specialization": "Cardiology",
            "qualifications": ["MBBS", "MD"],
            "years_of_experience": 12,
            "image_path": null,
            "is_active": true,
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z"
        })
    }

    pub fn inactive_doctor_row(id: &str, user_id: &str, name: &str) -> serde_json::Value {
        let mut row = Self::doctor_row(id, user_id, name);
        row["is_active"] = json!(false);
        row
    }

    pub fn patient_row(id: &str, user_id: &str, name: &str) -> serde_json::Value {
        json!({
            "id": id,
            "user_id": user_id,
            "name": name,
            "date_of_birth": "1990-06-15",
            "gender": "F",
            "phone_number": "0851234567",
            "email": "patient@example.com",
            "age": 35,
            "blood_group": "O+",
            "is_active": true,
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z"
        })
    }

    pub fn inactive_patient_row(id: &str, user_id: &str, name: &str) -> serde_json::Value {
        let mut row = Self::patient_row(id, user_id, name);
        row["is_active"] = json!(false);
        row
    }

    pub fn appointment_row(
        id: &str,
        doctor_id: &str,
        patient_id: &str,
        date: &str,
        time: &str,
        status: &str,
    ) -> serde_json::Value {
        json!({
            "id": id,
            "doctor_id": doctor_id,
            "patient_id": patient_id,
            "date": date,
            "time": time,
            "status": status,
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z"
        })
    }

    pub fn medical_record_row(
        id: &str,
        doctor_id: &str,
        patient_id: &str,
        description: &str,
        created_at: &str,
    ) -> serde_json::Value {
        json!({
            "id": id,
            "doctor_id": doctor_id,
            "patient_id": patient_id,
            "description": description,
            "created_at": created_at
        })
    }

    pub fn conversation_row(
        id: &str,
        doctor_user_id: &str,
        patient_user_id: &str,
    ) -> serde_json::Value {
        json!({
            "id": id,
            "doctor_user_id": doctor_user_id,
            "patient_user_id": patient_user_id,
            "created_at": "2024-01-01T00:00:00Z"
        })
    }

    pub fn message_row(
        id: &str,
        conversation_id: &str,
        sender_id: &str,
        content: &str,
        created_at: &str,
    ) -> serde_json::Value {
        json!({
            "id": id,
            "conversation_id": conversation_id,
            "sender_id": sender_id,
            "content": content,
            "created_at": created_at
        })
    }

    pub fn admin_user_row(id: &str, email: &str) -> serde_json::Value {
        json!({
            "id": id,
            "aud": "authenticated",
            "role": "authenticated",
            "email": email,
            "email_confirmed_at": "2024-01-01T00:00:00Z",
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z"
        })
    }

    pub fn password_grant_response(user_id: &str, email: &str) -> serde_json::Value {
        json!({
            "access_token": "header.payload.signature",
            "token_type": "bearer",
            "expires_in": 3600,
            "refresh_token": "refresh-token-value",
            "user": {
                "id": user_id,
                "email": email,
                "aud": "authenticated",
                "role": "authenticated"
            }
        })
    }
}

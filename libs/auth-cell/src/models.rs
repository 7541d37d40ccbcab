use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// GoTrue password-grant session, passed through to the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub refresh_token: String,
    pub user: SessionUser,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: Uuid,
    pub email: Option<String>,
}

/// Nested account credentials accepted by the registration endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct AccountCredentials {
    pub username: String,
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

/// Identity created through the GoTrue admin API.
#[derive(Debug, Clone, Deserialize)]
pub struct AdminUser {
    pub id: Uuid,
    pub email: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Disabled account")]
    AccountDisabled,

    #[error("Identity provider error: {0}")]
    Provider(String),
}

#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("An account with this email already exists")]
    EmailTaken,

    #[error("Identity provider error: {0}")]
    Provider(String),
}

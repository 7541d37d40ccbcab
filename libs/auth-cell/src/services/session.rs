use reqwest::Method;
use serde_json::json;
use tracing::{debug, warn};

use shared_config::AppConfig;
use shared_database::{SupabaseClient, SupabaseError};

use crate::models::{AuthError, Session};

pub struct SessionService {
    supabase: SupabaseClient,
}

impl SessionService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    /// Exchange email + password for an access token via the GoTrue
    /// password grant.
    pub async fn login(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        debug!("Password grant for {}", email);

        let body = json!({
            "email": email,
            "password": password,
        });

        let session: Session = self
            .supabase
            .request(
                Method::POST,
                "/auth/v1/token?grant_type=password",
                None,
                Some(body),
            )
            .await
            .map_err(map_grant_error)?;

        Ok(session)
    }

    /// Revoke the session behind an access token.
    pub async fn logout(&self, auth_token: &str) -> Result<(), AuthError> {
        debug!("Revoking session");

        self.supabase
            .request_no_content(Method::POST, "/auth/v1/logout", Some(auth_token), None)
            .await
            .map_err(|e| AuthError::Provider(e.to_string()))
    }
}

/// GoTrue reports both bad credentials and banned accounts as client errors;
/// the error code in the body tells them apart.
fn map_grant_error(err: SupabaseError) -> AuthError {
    match err {
        SupabaseError::Auth(message) | SupabaseError::Api { message, .. } => {
            if message.contains("banned") || message.contains("user_banned") {
                warn!("Login attempt against a banned account");
                AuthError::AccountDisabled
            } else {
                AuthError::InvalidCredentials
            }
        }
        other => AuthError::Provider(other.to_string()),
    }
}

use reqwest::Method;
use serde_json::json;
use tracing::{debug, error};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::{SupabaseClient, SupabaseError};

use crate::models::{AccountCredentials, AdminUser, IdentityError};

/// GoTrue admin operations used by registration. Profile cells create the
/// identity first, then their profile row, and roll the identity back if the
/// row insert fails.
pub struct IdentityService {
    supabase: SupabaseClient,
}

impl IdentityService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    pub async fn create_identity(
        &self,
        credentials: &AccountCredentials,
        role: &str,
    ) -> Result<AdminUser, IdentityError> {
        debug!("Creating {} identity for {}", role, credentials.email);

        let body = json!({
            "email": credentials.email,
            "password": credentials.password,
            "email_confirm": true,
            "user_metadata": {
                "username": credentials.username,
                "first_name": credentials.first_name,
                "last_name": credentials.last_name,
                "role": role,
            }
        });

        let user: AdminUser = self
            .supabase
            .admin_request(Method::POST, "/auth/v1/admin/users", Some(body))
            .await
            .map_err(map_admin_error)?;

        debug!("Identity {} created", user.id);
        Ok(user)
    }

    /// Registration rollback. Failure here is logged and swallowed: the
    /// original registration error is the one the caller must see.
    pub async fn delete_identity(&self, user_id: Uuid) {
        debug!("Deleting identity {}", user_id);

        let path = format!("/auth/v1/admin/users/{}", user_id);
        if let Err(e) = self
            .supabase
            .admin_request_no_content(Method::DELETE, &path, None)
            .await
        {
            error!("Failed to roll back identity {}: {}", user_id, e);
        }
    }
}

fn map_admin_error(err: SupabaseError) -> IdentityError {
    match err {
        SupabaseError::Conflict(_) => IdentityError::EmailTaken,
        SupabaseError::Api { status: 422, message } if message.contains("already") => {
            IdentityError::EmailTaken
        }
        other => IdentityError::Provider(other.to_string()),
    }
}

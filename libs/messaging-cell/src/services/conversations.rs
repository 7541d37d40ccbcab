use chrono::Utc;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, info};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::{SupabaseClient, SupabaseError};

use crate::models::{Conversation, MessagingError};

pub struct ConversationService {
    supabase: SupabaseClient,
}

impl ConversationService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    /// The thread for a (doctor identity, patient identity) pair, created on
    /// first use. The unique index on the pair makes this race-safe: a 409
    /// from a concurrent create means the row now exists, so it is re-read.
    pub async fn get_or_create(
        &self,
        doctor_user_id: Uuid,
        patient_user_id: Uuid,
        auth_token: &str,
    ) -> Result<Conversation, MessagingError> {
        if let Some(existing) = self
            .find_by_pair(doctor_user_id, patient_user_id, auth_token)
            .await?
        {
            return Ok(existing);
        }

        let conversation_data = json!({
            "doctor_user_id": doctor_user_id,
            "patient_user_id": patient_user_id,
            "created_at": Utc::now().to_rfc3339(),
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
                "/rest/v1/conversations",
                Some(auth_token),
                Some(conversation_data),
                Some(headers),
            )
            .await;

        match inserted {
            Ok(mut rows) if !rows.is_empty() => {
                let conversation: Conversation = serde_json::from_value(rows.remove(0))
                    .map_err(|e| {
                        MessagingError::Database(format!("Failed to parse conversation: {}", e))
                    })?;
                info!("Conversation {} created", conversation.id);
                Ok(conversation)
            }
            Ok(_) => Err(MessagingError::Database(
                "Insert returned no row".to_string(),
            )),
            Err(SupabaseError::Conflict(_)) => {
                debug!("Concurrent conversation create, re-reading pair");
                self.find_by_pair(doctor_user_id, patient_user_id, auth_token)
                    .await?
                    .ok_or(MessagingError::ConversationNotFound)
            }
            Err(other) => Err(MessagingError::Database(other.to_string())),
        }
    }

    pub async fn get_conversation(
        &self,
        conversation_id: Uuid,
        auth_token: &str,
    ) -> Result<Conversation, MessagingError> {
        let path = format!("/rest/v1/conversations?id=eq.{}", conversation_id);

        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await
            .map_err(|e| MessagingError::Database(e.to_string()))?;

        let row = result
            .into_iter()
            .next()
            .ok_or(MessagingError::ConversationNotFound)?;

        serde_json::from_value(row)
            .map_err(|e| MessagingError::Database(format!("Failed to parse conversation: {}", e)))
    }

    async fn find_by_pair(
        &self,
        doctor_user_id: Uuid,
        patient_user_id: Uuid,
        auth_token: &str,
    ) -> Result<Option<Conversation>, MessagingError> {
        let path = format!(
            "/rest/v1/conversations?doctor_user_id=eq.{}&patient_user_id=eq.{}",
            doctor_user_id, patient_user_id
        );

        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await
            .map_err(|e| MessagingError::Database(e.to_string()))?;

        match result.into_iter().next() {
            Some(row) => {
                let conversation = serde_json::from_value(row).map_err(|e| {
                    MessagingError::Database(format!("Failed to parse conversation: {}", e))
                })?;
                Ok(Some(conversation))
            }
            None => Ok(None),
        }
    }
}

use chrono::Utc;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, info};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::SupabaseClient;
use shared_models::validation::FieldErrors;

use crate::models::{CreateMessageRequest, Message, MessageListQuery, MessagingError};
use crate::services::conversations::ConversationService;

pub struct MessageService {
    supabase: SupabaseClient,
    conversations: ConversationService,
}

impl MessageService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
            conversations: ConversationService::new(config),
        }
    }

    /// Append a message to a conversation. The sender is the authenticated
    /// caller and must be one of the two participants.
    pub async fn create_message(
        &self,
        request: CreateMessageRequest,
        sender_id: Uuid,
        auth_token: &str,
    ) -> Result<Message, MessagingError> {
        debug!(
            "Creating message in conversation {} from {}",
            request.conversation_id, sender_id
        );

        let conversation = self
            .conversations
            .get_conversation(request.conversation_id, auth_token)
            .await?;

        if !conversation.has_participant(sender_id) {
            return Err(MessagingError::NotParticipant);
        }

        let message_data = json!({
            "conversation_id": request.conversation_id,
            "sender_id": sender_id,
            "content": request.content,
            "created_at": Utc::now().to_rfc3339(),
        });

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            "Prefer",
            reqwest::header::HeaderValue::from_static("return=representation"),
        );

        let inserted: Vec<Value> = self
            .supabase
            .request_with_headers(
                Method::POST,
                "/rest/v1/messages",
                Some(auth_token),
                Some(message_data),
                Some(headers),
            )
            .await
            .map_err(|e| MessagingError::Database(e.to_string()))?;

        let row = inserted
            .into_iter()
            .next()
            .ok_or_else(|| MessagingError::Database("Insert returned no row".to_string()))?;

        let message: Message = serde_json::from_value(row)
            .map_err(|e| MessagingError::Database(format!("Failed to parse message: {}", e)))?;

        info!("Message {} appended to conversation {}", message.id, message.conversation_id);
        Ok(message)
    }

    /// Messages newest first, optionally scoped to one conversation.
    pub async fn list_messages(
        &self,
        query: MessageListQuery,
        auth_token: &str,
    ) -> Result<Vec<Message>, MessagingError> {
        let path = match query.conversation_id {
            Some(conversation_id) => format!(
                "/rest/v1/messages?conversation_id=eq.{}&order=created_at.desc",
                conversation_id
            ),
            None => "/rest/v1/messages?order=created_at.desc".to_string(),
        };

        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await
            .map_err(|e| MessagingError::Database(e.to_string()))?;

        result
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<Message>, _>>()
            .map_err(|e| MessagingError::Database(format!("Failed to parse messages: {}", e)))
    }
}

pub fn validate(request: &CreateMessageRequest) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();

    if request.content.trim().is_empty() {
        errors.add("content", "must not be empty");
    }

    errors.into_result()
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One thread per (doctor identity, patient identity) pair, enforced by a
/// unique index on the pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    pub id: Uuid,
    pub doctor_user_id: Uuid,
    pub patient_user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Conversation {
    pub fn has_participant(&self, user_id: Uuid) -> bool {
        self.doctor_user_id == user_id || self.patient_user_id == user_id
    }
}

/// Append-only, timestamped child of a conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub sender_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateMessageRequest {
    pub conversation_id: Uuid,
    pub content: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateConversationRequest {
    pub doctor_user_id: Uuid,
    pub patient_user_id: Uuid,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessageListQuery {
    pub conversation_id: Option<Uuid>,
}

#[derive(Debug, thiserror::Error)]
pub enum MessagingError {
    #[error("Conversation not found")]
    ConversationNotFound,

    #[error("Sender is not a participant of this conversation")]
    NotParticipant,

    #[error("Database error: {0}")]
    Database(String),
}

use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};
use axum_extra::TypedHeader;
use headers::{authorization::Bearer, Authorization};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::User;
use shared_models::error::AppError;
use shared_models::validation::FieldErrors;

use crate::models::{CreateConversationRequest, CreateMessageRequest, MessageListQuery, MessagingError};
use crate::services::{ConversationService, MessageService};

fn map_messaging_error(err: MessagingError) -> AppError {
    match err {
        MessagingError::ConversationNotFound => {
            let mut errors = FieldErrors::new();
            errors.add("conversation_id", "unknown conversation");
            AppError::Validation(errors)
        }
        MessagingError::NotParticipant => AppError::BadRequest(err.to_string()),
        MessagingError::Database(msg) => AppError::Database(msg),
    }
}

fn sender_id(user: &User) -> Result<Uuid, AppError> {
    Uuid::parse_str(&user.id)
        .map_err(|_| AppError::Auth("Caller identity is not a valid user id".to_string()))
}

#[axum::debug_handler]
pub async fn list_messages(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Query(query): Query<MessageListQuery>,
) -> Result<Json<Value>, AppError> {
    let service = MessageService::new(&config);

    let messages = service
        .list_messages(query, auth.token())
        .await
        .map_err(map_messaging_error)?;

    Ok(Json(json!(messages)))
}

#[axum::debug_handler]
pub async fn create_message(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Json(request): Json<CreateMessageRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    crate::services::messages::validate(&request).map_err(AppError::Validation)?;

    let service = MessageService::new(&config);

    let message = service
        .create_message(request, sender_id(&user)?, auth.token())
        .await
        .map_err(map_messaging_error)?;

    Ok((StatusCode::CREATED, Json(json!(message))))
}

#[axum::debug_handler]
pub async fn get_or_create_conversation(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Json(request): Json<CreateConversationRequest>,
) -> Result<Json<Value>, AppError> {
    let caller = sender_id(&user)?;
    if caller != request.doctor_user_id && caller != request.patient_user_id {
        return Err(AppError::BadRequest(
            "Caller must be a participant of the conversation".to_string(),
        ));
    }

    let service = ConversationService::new(&config);

    let conversation = service
        .get_or_create(request.doctor_user_id, request.patient_user_id, auth.token())
        .await
        .map_err(map_messaging_error)?;

    Ok(Json(json!(conversation)))
}

#[axum::debug_handler]
pub async fn list_conversation_messages(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Path(conversation_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = MessageService::new(&config);

    let messages = service
        .list_messages(
            MessageListQuery {
                conversation_id: Some(conversation_id),
            },
            auth.token(),
        )
        .await
        .map_err(map_messaging_error)?;

    Ok(Json(json!(messages)))
}

//! Conversation and messaging route handlers.
//!
//! There is no push channel; clients poll the message list with an `after`
//! cursor to pick up new messages.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use tracing::info;

use townsquare_core::{BusinessId, ConversationId, ConversationKey, MessageId};

use crate::db::businesses::BusinessRepository;
use crate::db::conversations::ConversationRepository;
use crate::db::users::UserRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::{Conversation, ConversationSide, CurrentUser, Message};
use crate::state::AppState;

/// Request to open (or return) a thread with a business.
#[derive(Debug, Deserialize)]
pub struct StartConversationRequest {
    pub business_id: BusinessId,
}

/// Request to send a message.
#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub body: String,
}

/// Message polling cursor.
#[derive(Debug, Default, Deserialize)]
pub struct MessagesQuery {
    /// Only return messages with an ID greater than this.
    pub after: Option<MessageId>,
}

/// List the signed-in user's threads, most recently active first.
///
/// Customers see the threads they started; a business owner sees their
/// business's threads.
///
/// # Errors
///
/// Returns an error if the query fails.
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Vec<Conversation>>> {
    let conversations = ConversationRepository::new(state.pool());

    let threads = match owned_business(&state, &user).await? {
        Some(business_id) => conversations.list_for_business(business_id).await?,
        None => conversations.list_for_customer(user.id).await?,
    };

    Ok(Json(threads))
}

/// Open the thread with a business, creating it on first contact.
///
/// The thread key is derived from the two participant emails, so repeated
/// starts always land in the same thread.
///
/// # Errors
///
/// Returns 404 if the business doesn't exist.
pub async fn start(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(body): Json<StartConversationRequest>,
) -> Result<(StatusCode, Json<Conversation>)> {
    let business = BusinessRepository::new(state.pool())
        .get_by_id(body.business_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("business {}", body.business_id)))?;

    let customer = UserRepository::new(state.pool())
        .get_by_id(user.id)
        .await?
        .ok_or_else(|| AppError::NotFound("account".to_string()))?;

    let key = ConversationKey::derive(&customer.email, &business.owner_email);

    let conversation = ConversationRepository::new(state.pool())
        .get_or_create(
            &key,
            customer.id,
            business.id,
            &customer.display_name(),
            &business.name,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(conversation)))
}

/// List a thread's messages in send order.
///
/// # Errors
///
/// Returns 403 if the signed-in user isn't a participant.
pub async fn messages(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<ConversationId>,
    Query(query): Query<MessagesQuery>,
) -> Result<Json<Vec<Message>>> {
    let (conversation, _) = participant(&state, &user, id).await?;

    let messages = ConversationRepository::new(state.pool())
        .messages(conversation.id, query.after)
        .await?;

    Ok(Json(messages))
}

/// Send a message into a thread.
///
/// # Errors
///
/// Returns 403 if the signed-in user isn't a participant, or 400 for an
/// empty body.
pub async fn send(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<ConversationId>,
    Json(body): Json<SendMessageRequest>,
) -> Result<(StatusCode, Json<Message>)> {
    let text = body.body.trim();
    if text.is_empty() {
        return Err(AppError::BadRequest("empty message".to_string()));
    }

    let (conversation, side) = participant(&state, &user, id).await?;

    let message = ConversationRepository::new(state.pool())
        .send_message(conversation.id, side, text)
        .await?;

    info!(conversation_id = %conversation.id, sender = side.as_str(), "Message sent");

    Ok((StatusCode::CREATED, Json(message)))
}

/// Mark a thread read from the signed-in user's side.
///
/// # Errors
///
/// Returns 403 if the signed-in user isn't a participant.
pub async fn mark_read(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<ConversationId>,
) -> Result<StatusCode> {
    let (conversation, side) = participant(&state, &user, id).await?;

    ConversationRepository::new(state.pool())
        .mark_read(conversation.id, side)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// The business the signed-in user owns, if any.
async fn owned_business(state: &AppState, user: &CurrentUser) -> Result<Option<BusinessId>> {
    let business = BusinessRepository::new(state.pool())
        .get_by_owner_email(&user.email)
        .await?;
    Ok(business.map(|b| b.id))
}

/// Resolve the thread and which side of it the signed-in user is.
async fn participant(
    state: &AppState,
    user: &CurrentUser,
    id: ConversationId,
) -> Result<(Conversation, ConversationSide)> {
    let conversation = ConversationRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("conversation {id}")))?;

    if conversation.customer_id == user.id {
        return Ok((conversation, ConversationSide::Customer));
    }

    if owned_business(state, user).await? == Some(conversation.business_id) {
        return Ok((conversation, ConversationSide::Business));
    }

    Err(AppError::Forbidden(
        "not a participant in this conversation".to_string(),
    ))
}

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use metrics::counter;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use linkup_shared::clients::db;
use linkup_shared::errors::AppResult;
use linkup_shared::types::auth::AuthUser;
use linkup_shared::types::pagination::{Paginated, PaginationParams};
use linkup_shared::types::ApiResponse;

use crate::events::publisher;
use crate::models::Message;
use crate::services::chat_service;
use crate::socket::handlers::user_room;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct UnreadCountResponse {
    pub total_unread: i64,
}

#[derive(Debug, Serialize)]
pub struct MarkReadResponse {
    pub conversation_id: Uuid,
    pub marked: usize,
}

// --- POST /matches/:match_id/messages ---

pub async fn send_message(
    auth_user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(match_id): Path<Uuid>,
    Json(req): Json<SendMessageRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Message>>)> {
    let content = chat_service::validate_content(&req.content)?;

    let mut conn = db::conn(&state.db)?;
    let sent = chat_service::send_message(&mut conn, auth_user.id, match_id, content)?;
    drop(conn);

    counter!("messaging_messages_sent_total").increment(1);

    let payload = serde_json::json!({
        "conversation_id": sent.conversation.id,
        "match_id": sent.conversation.match_id,
        "message": &sent.message,
    });
    if let Err(e) = state.io.to(user_room(sent.recipient_id)).emit("new_message", &payload) {
        tracing::warn!(error = %e, recipient = %sent.recipient_id, "socket emit new_message failed");
    }

    publisher::publish_message_sent(&state.rabbitmq, &sent).await;

    tracing::info!(
        sender = %auth_user.id,
        conversation = %sent.conversation.id,
        message_id = %sent.message.id,
        "message sent"
    );

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(sent.message))))
}

// --- GET /conversations/:id/messages ---

pub async fn list_messages(
    auth_user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(conversation_id): Path<Uuid>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<ApiResponse<Paginated<Message>>>> {
    let mut conn = db::conn(&state.db)?;
    let page = chat_service::list_messages(&mut conn, auth_user.id, conversation_id, &params)?;
    Ok(Json(ApiResponse::ok(page)))
}

// --- POST /conversations/:id/read ---

pub async fn mark_as_read(
    auth_user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(conversation_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<MarkReadResponse>>> {
    let mut conn = db::conn(&state.db)?;
    let (conversation, marked) = chat_service::mark_read(&mut conn, auth_user.id, conversation_id)?;
    drop(conn);

    if marked > 0 {
        if let Some(partner) = conversation.partner_of(auth_user.id) {
            let payload = serde_json::json!({
                "conversation_id": conversation_id,
                "reader_id": auth_user.id,
                "count": marked,
                "read_at": Utc::now(),
            });
            if let Err(e) = state.io.to(user_room(partner)).emit("messages_read", &payload) {
                tracing::warn!(error = %e, recipient = %partner, "socket emit messages_read failed");
            }
        }
        publisher::publish_messages_read(&state.rabbitmq, conversation_id, auth_user.id, marked as i64)
            .await;
    }

    Ok(Json(ApiResponse::ok(MarkReadResponse { conversation_id, marked })))
}

// --- GET /unread-count ---

pub async fn get_unread_count(
    auth_user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<UnreadCountResponse>>> {
    let mut conn = db::conn(&state.db)?;
    let total_unread = chat_service::unread_count(&mut conn, auth_user.id)?;
    Ok(Json(ApiResponse::ok(UnreadCountResponse { total_unread })))
}

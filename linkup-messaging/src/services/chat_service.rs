use chrono::{DateTime, Utc};
use diesel::dsl::count_star;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use serde::Serialize;
use uuid::Uuid;

use linkup_shared::errors::{AppError, AppResult, ErrorCode};
use linkup_shared::types::pagination::{Paginated, PaginationParams};

use crate::models::{Conversation, MatchRow, Message, NewConversation, NewMessage};
use crate::schema::{conversations, matches, messages};

pub const MAX_MESSAGE_CHARS: usize = 2000;
pub const PREVIEW_CHARS: usize = 100;

// --- Rules ---

/// Trims a message body and checks its length.
pub fn validate_content(raw: &str) -> AppResult<String> {
    let content = raw.trim();
    if content.is_empty() {
        return Err(AppError::new(ErrorCode::ValidationError, "message cannot be empty"));
    }
    if content.chars().count() > MAX_MESSAGE_CHARS {
        return Err(AppError::new(
            ErrorCode::MessageTooLong,
            format!("message exceeds {MAX_MESSAGE_CHARS} characters"),
        ));
    }
    Ok(content.to_string())
}

pub fn preview(content: &str) -> String {
    content.chars().take(PREVIEW_CHARS).collect()
}

/// Who the sender is talking to, provided the match allows chatting.
pub fn recipient_for(m: &MatchRow, sender: Uuid) -> AppResult<Uuid> {
    let recipient = m.partner_of(sender).ok_or_else(|| {
        AppError::new(ErrorCode::NotConversationMember, "you are not part of this match")
    })?;
    if !m.is_active {
        return Err(AppError::new(ErrorCode::MatchInactive, "this match has ended"));
    }
    Ok(recipient)
}

// --- Conversations ---

#[derive(Debug, Serialize)]
pub struct ConversationPreview {
    pub id: Uuid,
    pub match_id: Uuid,
    pub partner_id: Uuid,
    pub match_active: bool,
    pub last_message: Option<String>,
    pub last_message_at: Option<DateTime<Utc>>,
    pub last_sender_id: Option<Uuid>,
    pub unread_count: i64,
    pub updated_at: DateTime<Utc>,
}

fn load_match(conn: &mut PgConnection, match_id: Uuid) -> AppResult<MatchRow> {
    matches::table
        .find(match_id)
        .first::<MatchRow>(conn)
        .optional()?
        .ok_or_else(|| AppError::new(ErrorCode::MatchNotFound, "match not found"))
}

/// Returns the match's conversation, creating it on first use.
fn conversation_for_match(conn: &mut PgConnection, m: &MatchRow) -> AppResult<Conversation> {
    diesel::insert_into(conversations::table)
        .values(&NewConversation {
            match_id: m.id,
            user_id_1: m.user_id_1,
            user_id_2: m.user_id_2,
        })
        .on_conflict(conversations::match_id)
        .do_nothing()
        .execute(conn)?;

    Ok(conversations::table
        .filter(conversations::match_id.eq(m.id))
        .first::<Conversation>(conn)?)
}

pub fn require_member(
    conn: &mut PgConnection,
    conversation_id: Uuid,
    user_id: Uuid,
) -> AppResult<Conversation> {
    let conv = conversations::table
        .find(conversation_id)
        .first::<Conversation>(conn)
        .optional()?
        .ok_or_else(|| AppError::new(ErrorCode::ConversationNotFound, "conversation not found"))?;

    if conv.partner_of(user_id).is_none() {
        return Err(AppError::new(
            ErrorCode::NotConversationMember,
            "you are not a member of this conversation",
        ));
    }
    Ok(conv)
}

pub fn list_conversations(conn: &mut PgConnection, me: Uuid) -> AppResult<Vec<ConversationPreview>> {
    let convs = conversations::table
        .filter(conversations::user_id_1.eq(me).or(conversations::user_id_2.eq(me)))
        .order(conversations::updated_at.desc())
        .load::<Conversation>(conn)?;

    if convs.is_empty() {
        return Ok(Vec::new());
    }

    let match_ids: Vec<Uuid> = convs.iter().map(|c| c.match_id).collect();
    let active: Vec<(Uuid, bool)> = matches::table
        .filter(matches::id.eq_any(&match_ids))
        .select((matches::id, matches::is_active))
        .load(conn)?;

    let conv_ids: Vec<Uuid> = convs.iter().map(|c| c.id).collect();
    let unread: Vec<(Uuid, i64)> = messages::table
        .filter(messages::conversation_id.eq_any(&conv_ids))
        .filter(messages::sender_id.ne(me))
        .filter(messages::read_at.is_null())
        .group_by(messages::conversation_id)
        .select((messages::conversation_id, count_star()))
        .load(conn)?;

    let mut previews = Vec::with_capacity(convs.len());
    for conv in convs {
        let last = messages::table
            .filter(messages::conversation_id.eq(conv.id))
            .order(messages::created_at.desc())
            .first::<Message>(conn)
            .optional()?;

        previews.push(ConversationPreview {
            id: conv.id,
            match_id: conv.match_id,
            partner_id: conv.partner_of(me).unwrap_or(conv.user_id_1),
            match_active: active
                .iter()
                .find(|(id, _)| *id == conv.match_id)
                .map_or(false, |(_, a)| *a),
            last_message: last.as_ref().map(|m| preview(&m.content)),
            last_message_at: last.as_ref().map(|m| m.created_at),
            last_sender_id: last.as_ref().map(|m| m.sender_id),
            unread_count: unread
                .iter()
                .find(|(id, _)| *id == conv.id)
                .map_or(0, |(_, n)| *n),
            updated_at: conv.updated_at,
        });
    }

    Ok(previews)
}

// --- Messages ---

#[derive(Debug)]
pub struct SentMessage {
    pub message: Message,
    pub conversation: Conversation,
    pub recipient_id: Uuid,
}

pub fn send_message(
    conn: &mut PgConnection,
    sender: Uuid,
    match_id: Uuid,
    content: String,
) -> AppResult<SentMessage> {
    conn.transaction(|conn| {
        let m = load_match(conn, match_id)?;
        let recipient_id = recipient_for(&m, sender)?;
        let conv = conversation_for_match(conn, &m)?;

        let message = diesel::insert_into(messages::table)
            .values(&NewMessage {
                conversation_id: conv.id,
                sender_id: sender,
                content,
            })
            .get_result::<Message>(conn)?;

        let conversation = diesel::update(conversations::table.find(conv.id))
            .set(conversations::updated_at.eq(message.created_at))
            .get_result::<Conversation>(conn)?;

        Ok(SentMessage {
            message,
            conversation,
            recipient_id,
        })
    })
}

/// Newest first.
pub fn list_messages(
    conn: &mut PgConnection,
    me: Uuid,
    conversation_id: Uuid,
    params: &PaginationParams,
) -> AppResult<Paginated<Message>> {
    require_member(conn, conversation_id, me)?;

    let total: i64 = messages::table
        .filter(messages::conversation_id.eq(conversation_id))
        .count()
        .get_result(conn)?;

    let items = messages::table
        .filter(messages::conversation_id.eq(conversation_id))
        .order((messages::created_at.desc(), messages::id.desc()))
        .offset(params.offset() as i64)
        .limit(params.limit() as i64)
        .load::<Message>(conn)?;

    Ok(Paginated::new(items, total as u64, params))
}

/// Marks every unread message from the partner as read. Returns the
/// conversation and how many rows changed.
pub fn mark_read(
    conn: &mut PgConnection,
    me: Uuid,
    conversation_id: Uuid,
) -> AppResult<(Conversation, usize)> {
    let conv = require_member(conn, conversation_id, me)?;

    let marked = diesel::update(
        messages::table
            .filter(messages::conversation_id.eq(conversation_id))
            .filter(messages::sender_id.ne(me))
            .filter(messages::read_at.is_null()),
    )
    .set(messages::read_at.eq(Some(Utc::now())))
    .execute(conn)?;

    Ok((conv, marked))
}

pub fn unread_count(conn: &mut PgConnection, me: Uuid) -> AppResult<i64> {
    Ok(messages::table
        .inner_join(conversations::table)
        .filter(conversations::user_id_1.eq(me).or(conversations::user_id_2.eq(me)))
        .filter(messages::sender_id.ne(me))
        .filter(messages::read_at.is_null())
        .count()
        .get_result(conn)?)
}

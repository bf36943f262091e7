use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;
use uuid::Uuid;

use crate::schema::{conversations, matches, messages};

// --- Conversation ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = conversations)]
pub struct Conversation {
    pub id: Uuid,
    pub match_id: Uuid,
    pub user_id_1: Uuid,
    pub user_id_2: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Conversation {
    pub fn partner_of(&self, user_id: Uuid) -> Option<Uuid> {
        if self.user_id_1 == user_id {
            Some(self.user_id_2)
        } else if self.user_id_2 == user_id {
            Some(self.user_id_1)
        } else {
            None
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = conversations)]
pub struct NewConversation {
    pub match_id: Uuid,
    pub user_id_1: Uuid,
    pub user_id_2: Uuid,
}

// --- Message ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = messages)]
pub struct Message {
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub sender_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub read_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = messages)]
pub struct NewMessage {
    pub conversation_id: Uuid,
    pub sender_id: Uuid,
    pub content: String,
}

// --- Match (read-only) ---

#[derive(Debug, Queryable, Identifiable, Clone, PartialEq)]
#[diesel(table_name = matches)]
pub struct MatchRow {
    pub id: Uuid,
    pub user_id_1: Uuid,
    pub user_id_2: Uuid,
    pub is_active: bool,
}

impl MatchRow {
    pub fn partner_of(&self, user_id: Uuid) -> Option<Uuid> {
        if self.user_id_1 == user_id {
            Some(self.user_id_2)
        } else if self.user_id_2 == user_id {
            Some(self.user_id_1)
        } else {
            None
        }
    }
}

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;
use uuid::Uuid;

use linkup_shared::types::goal::Goal;

use crate::schema::{matches, profiles, user_actions};

// --- Profile (read-only) ---

#[derive(Debug, Queryable, Identifiable, Clone)]
#[diesel(table_name = profiles)]
pub struct ProfileRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub full_name: Option<String>,
    pub headline: Option<String>,
    pub location: Option<String>,
    pub goal: Option<String>,
    pub skills: serde_json::Value,
    pub avatar_url: Option<String>,
    pub onboarding_complete: bool,
}

/// Public card of a member as shown in feeds, inboxes and match lists.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct ProfileSummary {
    pub user_id: Uuid,
    pub profile_id: Uuid,
    pub full_name: Option<String>,
    pub headline: Option<String>,
    pub location: Option<String>,
    pub goal: Option<Goal>,
    pub skills: Vec<String>,
    pub avatar_url: Option<String>,
}

impl ProfileSummary {
    /// Placeholder for a member whose profile row could not be loaded.
    pub fn unknown(user_id: Uuid) -> Self {
        Self {
            user_id,
            profile_id: Uuid::nil(),
            full_name: None,
            headline: None,
            location: None,
            goal: None,
            skills: Vec::new(),
            avatar_url: None,
        }
    }
}

impl From<ProfileRow> for ProfileSummary {
    fn from(row: ProfileRow) -> Self {
        let goal = row.goal.as_deref().and_then(|g| g.parse::<Goal>().ok());
        let skills = serde_json::from_value::<Vec<String>>(row.skills).unwrap_or_default();
        Self {
            user_id: row.user_id,
            profile_id: row.id,
            full_name: row.full_name,
            headline: row.headline,
            location: row.location,
            goal,
            skills,
            avatar_url: row.avatar_url,
        }
    }
}

// --- UserAction ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = user_actions)]
pub struct UserAction {
    pub id: Uuid,
    pub user_id: Uuid,
    pub target_user_id: Uuid,
    pub action_type: String,
    pub message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = user_actions)]
pub struct NewUserAction {
    pub user_id: Uuid,
    pub target_user_id: Uuid,
    pub action_type: String,
    pub message: Option<String>,
}

// --- Match ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone, PartialEq)]
#[diesel(table_name = matches)]
pub struct Match {
    pub id: Uuid,
    pub user_id_1: Uuid,
    pub user_id_2: Uuid,
    pub created_at: DateTime<Utc>,
    pub is_active: bool,
    pub ended_at: Option<DateTime<Utc>>,
    pub ended_by: Option<Uuid>,
}

impl Match {
    pub fn involves(&self, user_id: Uuid) -> bool {
        self.user_id_1 == user_id || self.user_id_2 == user_id
    }

    /// The other member of the match, or `None` if `user_id` is not part of it.
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
#[diesel(table_name = matches)]
pub struct NewMatch {
    pub user_id_1: Uuid,
    pub user_id_2: Uuid,
}

use std::collections::HashMap;

use diesel::pg::PgConnection;
use diesel::prelude::*;
use uuid::Uuid;

use linkup_shared::errors::{AppError, AppResult, ErrorCode};

use crate::models::{ProfileRow, ProfileSummary};
use crate::schema::profiles;

pub fn find_profile(conn: &mut PgConnection, user_id: Uuid) -> AppResult<Option<ProfileRow>> {
    Ok(profiles::table
        .filter(profiles::user_id.eq(user_id))
        .first::<ProfileRow>(conn)
        .optional()?)
}

pub fn require_profile(conn: &mut PgConnection, user_id: Uuid) -> AppResult<ProfileRow> {
    find_profile(conn, user_id)?
        .ok_or_else(|| AppError::new(ErrorCode::ProfileNotFound, "profile not found"))
}

/// Summaries keyed by user id; unknown ids are simply absent.
pub fn load_summaries(
    conn: &mut PgConnection,
    user_ids: &[Uuid],
) -> AppResult<HashMap<Uuid, ProfileSummary>> {
    if user_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows = profiles::table
        .filter(profiles::user_id.eq_any(user_ids))
        .load::<ProfileRow>(conn)?;

    Ok(rows
        .into_iter()
        .map(|row| (row.user_id, ProfileSummary::from(row)))
        .collect())
}

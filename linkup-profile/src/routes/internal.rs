use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use linkup_shared::clients::db;
use linkup_shared::errors::AppResult;
use linkup_shared::middleware::ServiceUser;
use linkup_shared::types::pagination::MAX_PER_PAGE;
use linkup_shared::types::ApiResponse;

use crate::models::ProfileCard;
use crate::services::profile_service;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct BatchProfilesRequest {
    pub user_ids: Vec<Uuid>,
}

/// POST /internal/profiles/batch
///
/// Profile cards for up to one page of users, with Redis presence.
/// Unknown ids are left out of the response.
pub async fn batch_profiles(
    _service: ServiceUser,
    State(state): State<Arc<AppState>>,
    Json(mut req): Json<BatchProfilesRequest>,
) -> AppResult<Json<ApiResponse<Vec<ProfileCard>>>> {
    req.user_ids.truncate(MAX_PER_PAGE as usize);

    let mut conn = db::conn(&state.db)?;
    let found = profile_service::load_by_users(&mut conn, &req.user_ids)?;
    drop(conn);

    let mut cards = Vec::with_capacity(found.len());
    for p in &found {
        let is_online = state
            .redis
            .exists(&format!("online:{}", p.user_id))
            .await
            .unwrap_or(false);
        cards.push(ProfileCard::from_profile(p, is_online));
    }

    Ok(Json(ApiResponse::ok(cards)))
}

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use linkup_shared::clients::db;
use linkup_shared::errors::AppResult;
use linkup_shared::types::auth::AuthUser;
use linkup_shared::types::pagination::{Paginated, PaginationParams};
use linkup_shared::types::ApiResponse;

use crate::events::publisher;
use crate::models::Match;
use crate::services::match_service::{self, MatchView, RelationshipView};
use crate::AppState;

pub async fn list(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<ApiResponse<Paginated<MatchView>>>> {
    let mut conn = db::conn(&state.db)?;
    let page = match_service::list_matches(&mut conn, user.id, &params)?;
    Ok(Json(ApiResponse::ok(page)))
}

pub async fn get(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(match_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<MatchView>>> {
    let mut conn = db::conn(&state.db)?;
    let view = match_service::get_match(&mut conn, user.id, match_id)?;
    Ok(Json(ApiResponse::ok(view)))
}

#[derive(Debug, Serialize)]
pub struct UnmatchResponse {
    #[serde(rename = "match")]
    pub match_row: Match,
    pub ended: bool,
}

/// Ending an already-ended match succeeds without a second event.
pub async fn unmatch(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(match_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<UnmatchResponse>>> {
    let mut conn = db::conn(&state.db)?;
    let (match_row, ended) = match_service::unmatch(&mut conn, user.id, match_id)?;
    drop(conn);

    if ended {
        publisher::publish_match_ended(&state.rabbitmq, &match_row, user.id).await;
    }

    Ok(Json(ApiResponse::ok(UnmatchResponse { match_row, ended })))
}

// --- GET /matches/with/:user_id ---

pub async fn relationship(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(other): Path<Uuid>,
) -> AppResult<Json<ApiResponse<RelationshipView>>> {
    let mut conn = db::conn(&state.db)?;
    let view = match_service::relationship(&mut conn, user.id, other)?;
    Ok(Json(ApiResponse::ok(view)))
}

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use linkup_shared::clients::db;
use linkup_shared::errors::AppResult;
use linkup_shared::types::auth::AuthUser;
use linkup_shared::types::pagination::{Paginated, PaginationParams};
use linkup_shared::types::ApiResponse;

use crate::routes::actions::announce;
use crate::services::match_service::{self, IncomingLike, SwipeOutcome};
use crate::AppState;

// --- GET /likes/incoming ---

pub async fn incoming(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<ApiResponse<Paginated<IncomingLike>>>> {
    let mut conn = db::conn(&state.db)?;
    let page = match_service::incoming_likes(&mut conn, user.id, &params)?;
    Ok(Json(ApiResponse::ok(page)))
}

// --- POST /likes/:user_id/accept ---

#[derive(Debug, Default, Deserialize)]
pub struct AcceptRequest {
    pub message: Option<String>,
}

pub async fn accept(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(liker_id): Path<Uuid>,
    body: Option<Json<AcceptRequest>>,
) -> AppResult<Json<ApiResponse<SwipeOutcome>>> {
    let req = body.map(|Json(b)| b).unwrap_or_default();

    let mut conn = db::conn(&state.db)?;
    let outcome = match_service::accept_like(&mut conn, user.id, liker_id, req.message.as_deref())?;
    drop(conn);

    announce(&state, user.id, &outcome).await;

    Ok(Json(ApiResponse::ok_with_message(outcome, "like accepted")))
}

// --- POST /likes/:user_id/ignore ---

pub async fn ignore(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(liker_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<SwipeOutcome>>> {
    let mut conn = db::conn(&state.db)?;
    let outcome = match_service::ignore_like(&mut conn, user.id, liker_id)?;
    drop(conn);

    announce(&state, user.id, &outcome).await;

    Ok(Json(ApiResponse::ok_with_message(outcome, "like ignored")))
}

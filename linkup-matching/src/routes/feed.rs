use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use linkup_shared::clients::db;
use linkup_shared::errors::AppResult;
use linkup_shared::types::auth::AuthUser;
use linkup_shared::types::pagination::PaginationParams;
use linkup_shared::types::ApiResponse;

use crate::matching::feed::FeedPage;
use crate::matching::seed;
use crate::services::feed_service;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct FeedQuery {
    pub seed: Option<u64>,
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_per_page")]
    pub per_page: u64,
}

fn default_page() -> u64 { 1 }
fn default_per_page() -> u64 { 20 }

// --- GET /feed ---

pub async fn get_feed(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Query(query): Query<FeedQuery>,
) -> AppResult<Json<ApiResponse<FeedPage>>> {
    let seed = seed::resolve_seed(
        &state.redis,
        &user.id,
        query.seed,
        state.config.feed_seed_ttl_secs,
    )
    .await;
    let params = PaginationParams::new(query.page, query.per_page);

    let mut conn = db::conn(&state.db)?;
    let page = feed_service::load_feed(&mut conn, user.id, seed, &params)?;

    Ok(Json(ApiResponse::ok(FeedPage { page, seed })))
}

// --- POST /feed/refresh ---

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub reset: bool,
}

pub async fn refresh_feed(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<RefreshResponse>>> {
    seed::reset_seed(&state.redis, &user.id).await;
    Ok(Json(ApiResponse::ok(RefreshResponse { reset: true })))
}

use axum::extract::State;
use axum::Json;
use serde::Serialize;
use std::sync::Arc;

use linkup_shared::clients::db;
use linkup_shared::errors::AppResult;
use linkup_shared::types::auth::AuthUser;
use linkup_shared::types::ApiResponse;

use crate::services::chat_service::{self, ConversationPreview};
use crate::services::profile_client::{self, PartnerCard};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct ConversationListItem {
    #[serde(flatten)]
    pub conversation: ConversationPreview,
    pub partner: Option<PartnerCard>,
}

/// GET /conversations - most recently active first, with previews and unread counts
pub async fn list_conversations(
    auth_user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<Vec<ConversationListItem>>>> {
    let mut conn = db::conn(&state.db)?;
    let previews = chat_service::list_conversations(&mut conn, auth_user.id)?;
    drop(conn);

    let partner_ids: Vec<_> = previews.iter().map(|p| p.partner_id).collect();
    let mut partners = profile_client::fetch_partners(
        &state.http_client,
        &state.config.profile_service_url,
        &partner_ids,
    )
    .await;

    let items = previews
        .into_iter()
        .map(|conversation| ConversationListItem {
            partner: partners.remove(&conversation.partner_id),
            conversation,
        })
        .collect();

    Ok(Json(ApiResponse::ok(items)))
}

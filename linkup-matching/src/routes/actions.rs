use axum::extract::State;
use axum::Json;
use metrics::counter;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use linkup_shared::clients::db;
use linkup_shared::errors::AppResult;
use linkup_shared::types::auth::AuthUser;
use linkup_shared::types::ApiResponse;

use crate::events::publisher;
use crate::matching::reconcile::ActionKind;
use crate::services::match_service::{self, SwipeOutcome};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SwipeRequest {
    pub target_user_id: Uuid,
    pub action: String,
    pub message: Option<String>,
}

/// `action` label for `matching_swipes_total`; repeats of an unchanged action are not counted.
fn swipe_label(outcome: &SwipeOutcome) -> Option<String> {
    outcome.recorded.then(|| outcome.action.action_type.clone())
}

/// Emits the events and counters that follow a committed swipe.
pub(crate) async fn announce(state: &AppState, actor: Uuid, outcome: &SwipeOutcome) {
    if let Some(action) = swipe_label(outcome) {
        counter!("matching_swipes_total", "action" => action).increment(1);
    }

    if outcome.like_sent {
        publisher::publish_like_sent(&state.rabbitmq, &outcome.action).await;
    }

    if let (Some(kind), Some(m)) = (outcome.match_event, outcome.match_row.as_ref()) {
        counter!("matching_matches_created_total").increment(1);
        publisher::publish_match_created(&state.rabbitmq, m, kind, actor).await;
    }
}

// --- POST /actions ---

pub async fn swipe(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<SwipeRequest>,
) -> AppResult<Json<ApiResponse<SwipeOutcome>>> {
    let kind: ActionKind = req.action.parse()?;

    let mut conn = db::conn(&state.db)?;
    let outcome = match_service::swipe(
        &mut conn,
        user.id,
        req.target_user_id,
        kind,
        req.message.as_deref(),
    )?;
    drop(conn);

    announce(&state, user.id, &outcome).await;

    Ok(Json(ApiResponse::ok(outcome)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    use crate::models::UserAction;

    fn outcome(action_type: &str, recorded: bool) -> SwipeOutcome {
        SwipeOutcome {
            action: UserAction {
                id: Uuid::new_v4(),
                user_id: Uuid::new_v4(),
                target_user_id: Uuid::new_v4(),
                action_type: action_type.into(),
                message: None,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
            matched: false,
            match_row: None,
            recorded,
            like_sent: false,
            match_event: None,
        }
    }

    #[test]
    fn only_recorded_swipes_are_counted() {
        assert_eq!(swipe_label(&outcome("like", true)).as_deref(), Some("like"));
        assert_eq!(swipe_label(&outcome("pass", true)).as_deref(), Some("pass"));
        assert_eq!(swipe_label(&outcome("like", false)), None);
    }

    #[test]
    fn request_action_is_parsed_strictly() {
        let req: SwipeRequest = serde_json::from_value(serde_json::json!({
            "target_user_id": Uuid::new_v4(),
            "action": "superlike",
        }))
        .unwrap();
        assert!(req.action.parse::<ActionKind>().is_err());
        assert!(req.message.is_none());
    }
}

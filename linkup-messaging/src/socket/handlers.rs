use std::sync::Arc;

use serde::Serialize;
use socketioxide::extract::SocketRef;
use uuid::Uuid;

use linkup_shared::middleware::jwt_secret;
use linkup_shared::types::auth::Claims;

use crate::AppState;

#[derive(Debug, Serialize)]
pub struct ErrorPayload {
    pub code: String,
    pub message: String,
}

pub fn presence_key(user_id: Uuid) -> String {
    format!("online:{user_id}")
}

pub fn user_room(user_id: Uuid) -> String {
    format!("user:{user_id}")
}

/// Reads `token` from a handshake query string.
pub fn token_from_query(query: &str) -> Option<&str> {
    query.split('&').find_map(|pair| {
        let (key, value) = pair.split_once('=')?;
        (key == "token" && !value.is_empty()).then_some(value)
    })
}

fn get_user_id(socket: &SocketRef) -> Option<Uuid> {
    socket.extensions.get::<Uuid>()
}

fn authenticate_socket(socket: &SocketRef) -> Result<Uuid, String> {
    let query = socket.req_parts().uri.query().unwrap_or_default();
    let token = token_from_query(query).ok_or_else(|| "missing token query parameter".to_string())?;

    let claims = Claims::decode(token, &jwt_secret()).map_err(|e| e.to_string())?;
    Ok(claims.sub)
}

async fn refresh_presence(state: &AppState, user_id: Uuid) {
    let ttl = state.config.presence_ttl_secs;
    if let Err(e) = state.redis.set(&presence_key(user_id), "1", ttl).await {
        tracing::warn!(error = %e, user_id = %user_id, "failed to refresh presence");
    }
}

pub async fn on_connect_with_state(socket: SocketRef, state: Arc<AppState>) {
    let user_id = match authenticate_socket(&socket) {
        Ok(id) => id,
        Err(msg) => {
            tracing::warn!(error = %msg, "messaging socket auth failed");
            let payload = ErrorPayload {
                code: "AUTH_FAILED".into(),
                message: msg,
            };
            if let Err(e) = socket.emit("error", &payload) {
                tracing::warn!(error = %e, sid = %socket.id, "socket emit error failed");
            }
            socket.disconnect().ok();
            return;
        }
    };

    socket.extensions.insert(user_id);
    socket.join(user_room(user_id)).ok();

    tracing::info!(user_id = %user_id, sid = %socket.id, "messaging socket connected");

    refresh_presence(&state, user_id).await;

    if let Err(e) = socket.emit("connected", &serde_json::json!({ "user_id": user_id })) {
        tracing::warn!(error = %e, user_id = %user_id, "socket emit connected failed");
    }

    // Heartbeat keeps the presence key alive
    socket.on("heartbeat", {
        let state = state.clone();
        move |socket: SocketRef| {
            let state = state.clone();
            async move {
                if let Some(user_id) = get_user_id(&socket) {
                    refresh_presence(&state, user_id).await;
                }
            }
        }
    });

    socket.on_disconnect({
        let state = state.clone();
        move |socket: SocketRef| {
            let state = state.clone();
            async move {
                on_disconnect_with_state(socket, state).await;
            }
        }
    });
}

async fn on_disconnect_with_state(socket: SocketRef, state: Arc<AppState>) {
    let Some(user_id) = get_user_id(&socket) else {
        return;
    };

    tracing::info!(user_id = %user_id, sid = %socket.id, "messaging socket disconnected");

    if let Err(e) = state.redis.del(&presence_key(user_id)).await {
        tracing::warn!(error = %e, user_id = %user_id, "failed to clear presence");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_is_read_from_query() {
        assert_eq!(token_from_query("EIO=4&transport=websocket&token=abc.def.ghi"), Some("abc.def.ghi"));
        assert_eq!(token_from_query("token=xyz"), Some("xyz"));
    }

    #[test]
    fn missing_or_empty_token() {
        assert_eq!(token_from_query(""), None);
        assert_eq!(token_from_query("EIO=4&transport=polling"), None);
        assert_eq!(token_from_query("token="), None);
        assert_eq!(token_from_query("tokens=abc"), None);
    }

    #[test]
    fn key_formats() {
        let id = Uuid::nil();
        assert_eq!(presence_key(id), "online:00000000-0000-0000-0000-000000000000");
        assert_eq!(user_room(id), "user:00000000-0000-0000-0000-000000000000");
    }
}

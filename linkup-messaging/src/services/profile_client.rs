use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use linkup_shared::middleware::jwt_secret;
use linkup_shared::types::auth::{Claims, UserRole};
use linkup_shared::types::ApiResponse;

/// Partner card served by the profile service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PartnerCard {
    pub user_id: Uuid,
    pub full_name: Option<String>,
    pub headline: Option<String>,
    pub avatar_url: Option<String>,
    pub goal: Option<String>,
    #[serde(default)]
    pub is_online: bool,
}

const SERVICE_TOKEN_TTL_SECS: i64 = 60;

/// Looks up partner cards through `/internal/profiles/batch`.
///
/// Enrichment is best effort: any failure is logged and yields an empty map.
pub async fn fetch_partners(
    http: &reqwest::Client,
    base_url: &str,
    user_ids: &[Uuid],
) -> HashMap<Uuid, PartnerCard> {
    if user_ids.is_empty() {
        return HashMap::new();
    }

    let token = match Claims::new(Uuid::nil(), UserRole::ServiceRole, SERVICE_TOKEN_TTL_SECS)
        .encode(&jwt_secret())
    {
        Ok(t) => t,
        Err(e) => {
            tracing::warn!(error = %e, "failed to sign service token");
            return HashMap::new();
        }
    };

    let url = format!("{base_url}/internal/profiles/batch");
    let response = http
        .post(&url)
        .bearer_auth(token)
        .json(&serde_json::json!({ "user_ids": user_ids }))
        .send()
        .await
        .and_then(|r| r.error_for_status());

    let body = match response {
        Ok(r) => r.json::<ApiResponse<Vec<PartnerCard>>>().await,
        Err(e) => {
            tracing::warn!(error = %e, url = %url, "profile batch request failed");
            return HashMap::new();
        }
    };

    match body {
        Ok(body) => body.data.into_iter().map(|c| (c.user_id, c)).collect(),
        Err(e) => {
            tracing::warn!(error = %e, "failed to parse profile batch response");
            HashMap::new()
        }
    }
}

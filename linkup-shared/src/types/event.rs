use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Event envelope wrapping all domain events on the topic exchange.
///
/// Routing key format: `linkup.{domain}.{entity}.{action}`; the routing key is
/// also the `event_type`.
/// Example: `linkup.matching.match.created`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event<T: Serialize> {
    pub id: Uuid,
    pub source: String,
    pub event_type: String,
    pub timestamp: DateTime<Utc>,
    pub correlation_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
    pub data: T,
}

impl<T: Serialize> Event<T> {
    pub fn new(source: impl Into<String>, event_type: impl Into<String>, data: T) -> Self {
        Self {
            id: Uuid::now_v7(),
            source: source.into(),
            event_type: event_type.into(),
            timestamp: Utc::now(),
            correlation_id: None,
            user_id: None,
            data,
        }
    }

    pub fn with_user(mut self, user_id: Uuid) -> Self {
        self.user_id = Some(user_id);
        self
    }

    pub fn with_correlation(mut self, correlation_id: Uuid) -> Self {
        self.correlation_id = Some(correlation_id);
        self
    }
}

pub mod routing_keys {
    // Profile events
    pub const PROFILE_UPDATED: &str = "linkup.profile.profile.updated";
    pub const PROFILE_ONBOARDING_COMPLETED: &str = "linkup.profile.profile.onboarding_completed";

    // Matching events
    pub const MATCHING_LIKE_SENT: &str = "linkup.matching.like.sent";
    pub const MATCHING_MATCH_CREATED: &str = "linkup.matching.match.created";
    pub const MATCHING_MATCH_ENDED: &str = "linkup.matching.match.ended";

    // Messaging events
    pub const MESSAGING_MESSAGE_SENT: &str = "linkup.messaging.message.sent";
    pub const MESSAGING_MESSAGE_READ: &str = "linkup.messaging.message.read";
}

pub mod payloads {
    use serde::{Deserialize, Serialize};
    use uuid::Uuid;

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct ProfileUpdated {
        pub profile_id: Uuid,
        pub user_id: Uuid,
        pub onboarding_step: i16,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct OnboardingCompleted {
        pub user_id: Uuid,
        pub full_name: String,
        pub goal: String,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct LikeSent {
        pub liker_id: Uuid,
        pub liked_id: Uuid,
        pub message: Option<String>,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct MatchCreated {
        pub match_id: Uuid,
        pub user_id_1: Uuid,
        pub user_id_2: Uuid,
        pub reactivated: bool,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct MatchEnded {
        pub match_id: Uuid,
        pub user_id_1: Uuid,
        pub user_id_2: Uuid,
        pub ended_by: Uuid,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct MessageSent {
        pub message_id: Uuid,
        pub conversation_id: Uuid,
        pub match_id: Uuid,
        pub sender_id: Uuid,
        pub recipient_id: Uuid,
        pub content_preview: String,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct MessagesRead {
        pub conversation_id: Uuid,
        pub reader_id: Uuid,
        pub count: i64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_carries_routing_key_and_user() {
        let user = Uuid::new_v4();
        let event = Event::new(
            "linkup-matching",
            routing_keys::MATCHING_LIKE_SENT,
            payloads::LikeSent {
                liker_id: user,
                liked_id: Uuid::new_v4(),
                message: Some("hi".into()),
            },
        )
        .with_user(user);

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event_type"], "linkup.matching.like.sent");
        assert_eq!(json["user_id"], user.to_string());
        assert_eq!(json["data"]["message"], "hi");

        let back: Event<payloads::LikeSent> = serde_json::from_value(json).unwrap();
        assert_eq!(back.data.liker_id, user);
    }

    #[test]
    fn routing_keys_share_the_linkup_prefix() {
        for key in [
            routing_keys::PROFILE_UPDATED,
            routing_keys::PROFILE_ONBOARDING_COMPLETED,
            routing_keys::MATCHING_LIKE_SENT,
            routing_keys::MATCHING_MATCH_CREATED,
            routing_keys::MATCHING_MATCH_ENDED,
            routing_keys::MESSAGING_MESSAGE_SENT,
            routing_keys::MESSAGING_MESSAGE_READ,
        ] {
            assert!(key.starts_with("linkup."));
            assert_eq!(key.split('.').count(), 4);
        }
    }
}

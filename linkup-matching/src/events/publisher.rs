use uuid::Uuid;

use linkup_shared::clients::rabbitmq::RabbitMQClient;
use linkup_shared::types::event::{payloads, routing_keys, Event};

use crate::models::{Match, UserAction};
use crate::services::match_service::MatchEvent;

const SOURCE: &str = "linkup-matching";

pub async fn publish_like_sent(rabbitmq: &RabbitMQClient, like: &UserAction) {
    let event = Event::new(
        SOURCE,
        routing_keys::MATCHING_LIKE_SENT,
        payloads::LikeSent {
            liker_id: like.user_id,
            liked_id: like.target_user_id,
            message: like.message.clone(),
        },
    )
    .with_user(like.user_id);

    rabbitmq.publish_or_log(&event).await;
}

pub async fn publish_match_created(
    rabbitmq: &RabbitMQClient,
    m: &Match,
    kind: MatchEvent,
    triggered_by: Uuid,
) {
    let event = Event::new(
        SOURCE,
        routing_keys::MATCHING_MATCH_CREATED,
        payloads::MatchCreated {
            match_id: m.id,
            user_id_1: m.user_id_1,
            user_id_2: m.user_id_2,
            reactivated: kind == MatchEvent::Reactivated,
        },
    )
    .with_user(triggered_by);

    rabbitmq.publish_or_log(&event).await;
}

pub async fn publish_match_ended(rabbitmq: &RabbitMQClient, m: &Match, ended_by: Uuid) {
    let event = Event::new(
        SOURCE,
        routing_keys::MATCHING_MATCH_ENDED,
        payloads::MatchEnded {
            match_id: m.id,
            user_id_1: m.user_id_1,
            user_id_2: m.user_id_2,
            ended_by,
        },
    )
    .with_user(ended_by);

    rabbitmq.publish_or_log(&event).await;
}

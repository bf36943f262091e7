use linkup_shared::clients::rabbitmq::RabbitMQClient;
use linkup_shared::types::event::{payloads, routing_keys, Event};

use crate::models::Profile;

const SOURCE: &str = "linkup-profile";

pub async fn publish_profile_updated(rabbitmq: &RabbitMQClient, profile: &Profile) {
    let event = Event::new(
        SOURCE,
        routing_keys::PROFILE_UPDATED,
        payloads::ProfileUpdated {
            profile_id: profile.id,
            user_id: profile.user_id,
            onboarding_step: profile.onboarding_step,
        },
    )
    .with_user(profile.user_id);

    rabbitmq.publish_or_log(&event).await;
}

pub async fn publish_onboarding_completed(rabbitmq: &RabbitMQClient, profile: &Profile) {
    let event = Event::new(
        SOURCE,
        routing_keys::PROFILE_ONBOARDING_COMPLETED,
        payloads::OnboardingCompleted {
            user_id: profile.user_id,
            full_name: profile.full_name.clone().unwrap_or_default(),
            goal: profile.goal.clone().unwrap_or_default(),
        },
    )
    .with_user(profile.user_id);

    rabbitmq.publish_or_log(&event).await;
}

use linkup_shared::clients::rabbitmq::RabbitMQClient;
use linkup_shared::types::event::{payloads, routing_keys, Event};
use uuid::Uuid;

use crate::services::chat_service::{preview, SentMessage};

const SOURCE: &str = "linkup-messaging";

pub async fn publish_message_sent(rabbitmq: &RabbitMQClient, sent: &SentMessage) {
    let event = Event::new(
        SOURCE,
        routing_keys::MESSAGING_MESSAGE_SENT,
        payloads::MessageSent {
            message_id: sent.message.id,
            conversation_id: sent.conversation.id,
            match_id: sent.conversation.match_id,
            sender_id: sent.message.sender_id,
            recipient_id: sent.recipient_id,
            content_preview: preview(&sent.message.content),
        },
    )
    .with_user(sent.message.sender_id);

    rabbitmq.publish_or_log(&event).await;
}

pub async fn publish_messages_read(
    rabbitmq: &RabbitMQClient,
    conversation_id: Uuid,
    reader_id: Uuid,
    count: i64,
) {
    let event = Event::new(
        SOURCE,
        routing_keys::MESSAGING_MESSAGE_READ,
        payloads::MessagesRead {
            conversation_id,
            reader_id,
            count,
        },
    )
    .with_user(reader_id);

    rabbitmq.publish_or_log(&event).await;
}

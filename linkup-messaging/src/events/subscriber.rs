use std::sync::Arc;

use futures_lite::StreamExt;
use lapin::options::BasicAckOptions;
use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

use linkup_shared::types::event::{payloads, routing_keys, Event};

use crate::AppState;

const QUEUE: &str = "linkup-messaging.matching";

/// One realtime push to a user's room.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Push {
    pub user_id: Uuid,
    pub event: &'static str,
    pub payload: serde_json::Value,
}

fn parse<T: Serialize + DeserializeOwned>(data: &[u8]) -> anyhow::Result<Event<T>> {
    Ok(serde_json::from_slice::<Event<T>>(data)?)
}

/// Maps a matching event to the socket pushes it causes.
pub fn pushes_for(routing_key: &str, data: &[u8]) -> anyhow::Result<Vec<Push>> {
    match routing_key {
        routing_keys::MATCHING_MATCH_CREATED => {
            let event = parse::<payloads::MatchCreated>(data)?;
            let d = &event.data;
            Ok([(d.user_id_1, d.user_id_2), (d.user_id_2, d.user_id_1)]
                .into_iter()
                .map(|(user_id, partner_id)| Push {
                    user_id,
                    event: "match_created",
                    payload: serde_json::json!({
                        "match_id": d.match_id,
                        "partner_id": partner_id,
                        "reactivated": d.reactivated,
                    }),
                })
                .collect())
        }
        routing_keys::MATCHING_MATCH_ENDED => {
            let event = parse::<payloads::MatchEnded>(data)?;
            let d = &event.data;
            Ok([d.user_id_1, d.user_id_2]
                .into_iter()
                .map(|user_id| Push {
                    user_id,
                    event: "match_ended",
                    payload: serde_json::json!({
                        "match_id": d.match_id,
                        "ended_by": d.ended_by,
                    }),
                })
                .collect())
        }
        routing_keys::MATCHING_LIKE_SENT => {
            let event = parse::<payloads::LikeSent>(data)?;
            let d = &event.data;
            Ok(vec![Push {
                user_id: d.liked_id,
                event: "like_received",
                payload: serde_json::json!({
                    "from": d.liker_id,
                    "message": d.message,
                }),
            }])
        }
        other => {
            tracing::debug!(routing_key = %other, "ignoring unexpected event");
            Ok(Vec::new())
        }
    }
}

/// Relays match lifecycle and like events to connected sockets.
pub async fn listen_matching_events(state: Arc<AppState>) -> anyhow::Result<()> {
    let mut consumer = state
        .rabbitmq
        .subscribe(
            QUEUE,
            &[
                routing_keys::MATCHING_MATCH_CREATED,
                routing_keys::MATCHING_MATCH_ENDED,
                routing_keys::MATCHING_LIKE_SENT,
            ],
        )
        .await?;

    tracing::info!("listening for matching events");

    while let Some(delivery) = consumer.next().await {
        match delivery {
            Ok(delivery) => {
                let routing_key = delivery.routing_key.as_str();
                match pushes_for(routing_key, &delivery.data) {
                    Ok(pushes) => {
                        for push in pushes {
                            let room = format!("user:{}", push.user_id);
                            if let Err(e) = state.io.to(room).emit(push.event, &push.payload) {
                                tracing::warn!(
                                    error = %e,
                                    user_id = %push.user_id,
                                    event = push.event,
                                    "socket push failed"
                                );
                            }
                        }
                    }
                    Err(e) => {
                        tracing::error!(error = %e, routing_key = %routing_key, "failed to deserialize event");
                    }
                }
                if let Err(e) = delivery.ack(BasicAckOptions::default()).await {
                    tracing::warn!(error = %e, routing_key = %routing_key, "failed to ack event");
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "consumer error");
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode<T: Serialize>(key: &str, data: T) -> Vec<u8> {
        serde_json::to_vec(&Event::new("linkup-matching", key, data)).unwrap()
    }

    #[test]
    fn match_created_notifies_both_members() {
        let (a, b, m) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let raw = encode(
            routing_keys::MATCHING_MATCH_CREATED,
            payloads::MatchCreated {
                match_id: m,
                user_id_1: a,
                user_id_2: b,
                reactivated: false,
            },
        );

        let pushes = pushes_for(routing_keys::MATCHING_MATCH_CREATED, &raw).unwrap();
        assert_eq!(pushes.len(), 2);
        assert_eq!(pushes[0].user_id, a);
        assert_eq!(pushes[0].payload["partner_id"], serde_json::json!(b));
        assert_eq!(pushes[1].user_id, b);
        assert_eq!(pushes[1].payload["partner_id"], serde_json::json!(a));
        assert!(pushes.iter().all(|p| p.event == "match_created"));
    }

    #[test]
    fn match_ended_notifies_both_members() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let raw = encode(
            routing_keys::MATCHING_MATCH_ENDED,
            payloads::MatchEnded {
                match_id: Uuid::new_v4(),
                user_id_1: a,
                user_id_2: b,
                ended_by: a,
            },
        );

        let pushes = pushes_for(routing_keys::MATCHING_MATCH_ENDED, &raw).unwrap();
        let users: Vec<Uuid> = pushes.iter().map(|p| p.user_id).collect();
        assert_eq!(users, vec![a, b]);
        assert_eq!(pushes[0].payload["ended_by"], serde_json::json!(a));
    }

    #[test]
    fn like_goes_to_the_liked_user_only() {
        let (liker, liked) = (Uuid::new_v4(), Uuid::new_v4());
        let raw = encode(
            routing_keys::MATCHING_LIKE_SENT,
            payloads::LikeSent {
                liker_id: liker,
                liked_id: liked,
                message: Some("hi".into()),
            },
        );

        let pushes = pushes_for(routing_keys::MATCHING_LIKE_SENT, &raw).unwrap();
        assert_eq!(pushes.len(), 1);
        assert_eq!(pushes[0].user_id, liked);
        assert_eq!(pushes[0].event, "like_received");
        assert_eq!(pushes[0].payload["message"], "hi");
    }

    #[test]
    fn malformed_payload_is_an_error() {
        assert!(pushes_for(routing_keys::MATCHING_LIKE_SENT, b"{not json").is_err());
    }

    #[test]
    fn unknown_keys_produce_nothing() {
        assert!(pushes_for("linkup.other.thing", b"{}").unwrap().is_empty());
    }
}

use linkup_shared::clients::redis::RedisClient;
use uuid::Uuid;

use super::feed::fresh_seed;

const FEED_SEED_PREFIX: &str = "matching:feed_seed";

fn seed_key(user_id: &Uuid) -> String {
    format!("{FEED_SEED_PREFIX}:{user_id}")
}

/// Resolves the shuffle seed for a feed request.
///
/// An explicit seed wins and becomes the session seed. Otherwise the stored
/// session seed is reused, or a fresh one is generated and stored. Redis being
/// unavailable only costs page stability.
pub async fn resolve_seed(
    redis: &RedisClient,
    user_id: &Uuid,
    requested: Option<u64>,
    ttl_secs: u64,
) -> u64 {
    let key = seed_key(user_id);

    if let Some(seed) = requested {
        store(redis, &key, seed, ttl_secs).await;
        return seed;
    }

    match redis.get(&key).await {
        Ok(Some(raw)) => match raw.parse::<u64>() {
            Ok(seed) => {
                // Sliding expiry: an active session keeps its order.
                if let Err(e) = redis.expire(&key, ttl_secs as i64).await {
                    tracing::warn!(error = %e, user_id = %user_id, "failed to extend feed seed");
                }
                return seed;
            }
            Err(_) => tracing::warn!(user_id = %user_id, value = %raw, "discarding malformed feed seed"),
        },
        Ok(None) => {}
        Err(e) => tracing::warn!(error = %e, user_id = %user_id, "failed to read feed seed"),
    }

    let seed = fresh_seed();
    store(redis, &key, seed, ttl_secs).await;
    seed
}

async fn store(redis: &RedisClient, key: &str, seed: u64, ttl_secs: u64) {
    if let Err(e) = redis.set(key, &seed.to_string(), ttl_secs).await {
        tracing::warn!(error = %e, "failed to store feed seed");
    }
}

/// Drops the session seed so the next feed request reshuffles.
pub async fn reset_seed(redis: &RedisClient, user_id: &Uuid) {
    if let Err(e) = redis.del(&seed_key(user_id)).await {
        tracing::warn!(error = %e, user_id = %user_id, "failed to reset feed seed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_is_namespaced_per_user() {
        let id = Uuid::nil();
        assert_eq!(
            seed_key(&id),
            "matching:feed_seed:00000000-0000-0000-0000-000000000000"
        );
    }
}

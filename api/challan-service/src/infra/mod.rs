use crate::config::db::RedisConfig;
use redis::Client as RedisClient;

#[derive(Debug, Clone)]
pub struct InfraClients {
    pub redis: RedisClient,
}

pub const KEY_PREFIX: &str = "echallan";

pub const CHALLANS_COLLECTION: &str = "challans";
pub const PAYMENTS_COLLECTION: &str = "payments";
pub const VIOLATIONS_COLLECTION: &str = "violations";
pub const VEHICLES_COLLECTION: &str = "vehicles";
pub const CAMERAS_COLLECTION: &str = "cameras";
pub const GATES_COLLECTION: &str = "gates";
pub const GATE_ENTRIES_COLLECTION: &str = "gate_entries";
pub const EVIDENCE_COLLECTION: &str = "evidence";
pub const FINES_COLLECTION: &str = "fines_master";

pub async fn init_infra(redis: &RedisConfig) -> Result<InfraClients, String> {
    let redis_client = RedisClient::open(redis.url.clone())
        .map_err(|e| format!("redis client init failed: {e}"))?;

    // Fail fast so main can fall back to memory-only mode.
    let mut conn = redis_client
        .get_multiplexed_async_connection()
        .await
        .map_err(|e| format!("redis connect failed: {e}"))?;
    let _: String = redis::cmd("PING")
        .query_async(&mut conn)
        .await
        .map_err(|e| format!("redis ping failed: {e}"))?;

    Ok(InfraClients {
        redis: redis_client,
    })
}

pub fn record_key(collection: &str, id: &str) -> String {
    format!("{KEY_PREFIX}:{collection}:{id}")
}

/// Per-session slot holding the most recent recommendation result
///
/// Last writer wins. Every slot expires after the configured TTL so
/// abandoned sessions do not accumulate.
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;

use crate::{
    db::redis::{Cache, CacheKey},
    error::AppResult,
    models::RecommendationResult,
};

#[async_trait::async_trait]
pub trait SessionStore: Send + Sync {
    /// The session's last result, `None` if absent or expired
    async fn load(&self, session_id: &str) -> AppResult<Option<RecommendationResult>>;

    /// Replaces the session's last result
    async fn save(&self, session_id: &str, result: &RecommendationResult) -> AppResult<()>;
}

/// Session slots kept in Redis with `SETEX`
pub struct RedisSessionStore {
    cache: Cache,
    ttl_secs: u64,
}

impl RedisSessionStore {
    pub fn new(cache: Cache, ttl_secs: u64) -> Self {
        Self { cache, ttl_secs }
    }
}

#[async_trait::async_trait]
impl SessionStore for RedisSessionStore {
    async fn load(&self, session_id: &str) -> AppResult<Option<RecommendationResult>> {
        self.cache
            .get_from_cache(&CacheKey::LastRecommendation(session_id.to_string()))
            .await
    }

    async fn save(&self, session_id: &str, result: &RecommendationResult) -> AppResult<()> {
        self.cache.set_in_background(
            &CacheKey::LastRecommendation(session_id.to_string()),
            result,
            self.ttl_secs,
        );
        Ok(())
    }
}

/// Session slots kept in process memory
///
/// Expired slots are purged on every write.
#[derive(Clone)]
pub struct MemorySessionStore {
    slots: Arc<RwLock<HashMap<String, (Instant, RecommendationResult)>>>,
    ttl: Duration,
}

impl MemorySessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            slots: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    pub async fn len(&self) -> usize {
        self.slots.read().await.len()
    }
}

#[async_trait::async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self, session_id: &str) -> AppResult<Option<RecommendationResult>> {
        let slots = self.slots.read().await;
        Ok(slots
            .get(session_id)
            .filter(|(stored_at, _)| stored_at.elapsed() < self.ttl)
            .map(|(_, result)| result.clone()))
    }

    async fn save(&self, session_id: &str, result: &RecommendationResult) -> AppResult<()> {
        let mut slots = self.slots.write().await;
        let ttl = self.ttl;
        slots.retain(|_, (stored_at, _)| stored_at.elapsed() < ttl);
        slots.insert(session_id.to_string(), (Instant::now(), result.clone()));
        Ok(())
    }
}

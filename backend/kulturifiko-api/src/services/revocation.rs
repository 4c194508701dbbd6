// Revoked session tokens, checked on every authenticated request
use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use redis::AsyncCommands;

use crate::error::Result;

#[async_trait]
pub trait SessionRevocations: Send + Sync {
    /// Mark a token id revoked until it would have expired anyway
    async fn revoke(&self, token_id: &str, ttl_secs: u64) -> Result<()>;

    async fn is_revoked(&self, token_id: &str) -> Result<bool>;
}

/// Revocation list kept in Redis with per-key TTL
pub struct RedisRevocations {
    client: redis::Client,
}

impl RedisRevocations {
    pub fn new(client: redis::Client) -> Self {
        Self { client }
    }

    fn key(token_id: &str) -> String {
        format!("session_revoked:{}", token_id)
    }
}

#[async_trait]
impl SessionRevocations for RedisRevocations {
    async fn revoke(&self, token_id: &str, ttl_secs: u64) -> Result<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        conn.set_ex::<_, _, ()>(Self::key(token_id), "1", ttl_secs.max(1))
            .await?;
        Ok(())
    }

    async fn is_revoked(&self, token_id: &str) -> Result<bool> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let revoked: bool = conn.exists(Self::key(token_id)).await?;
        Ok(revoked)
    }
}

/// Process-local revocation list
#[derive(Default)]
pub struct MemoryRevocations {
    revoked: Mutex<HashMap<String, DateTime<Utc>>>,
}

impl MemoryRevocations {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionRevocations for MemoryRevocations {
    async fn revoke(&self, token_id: &str, ttl_secs: u64) -> Result<()> {
        let until = Utc::now() + Duration::seconds(ttl_secs.max(1) as i64);
        let mut revoked = self.revoked.lock();
        revoked.retain(|_, expires| *expires > Utc::now());
        revoked.insert(token_id.to_string(), until);
        Ok(())
    }

    async fn is_revoked(&self, token_id: &str) -> Result<bool> {
        Ok(self
            .revoked
            .lock()
            .get(token_id)
            .map(|expires| *expires > Utc::now())
            .unwrap_or(false))
    }
}

use anyhow::Result;
use async_trait::async_trait;
use chrono::Duration;
use redis::aio::MultiplexedConnection;
use tracing::info;

use crate::models::token::TokenRecord;
use crate::tokens::{TokenStore, TokenStoreError};

const KEY_PREFIX: &str = "profile-token:";

/// Records outlive their `expires_at` by this much so the registry can still
/// answer "expired" rather than "unknown" for a while after the deadline.
const RETENTION_GRACE_DAYS: i64 = 7;

/// Token store shared by every instance through Redis.
#[derive(Clone)]
pub struct RedisTokenStore {
    conn: MultiplexedConnection,
}

impl RedisTokenStore {
    pub async fn connect(redis_url: &str) -> Result<Self> {
        info!("Connecting to Redis...");
        let client = redis::Client::open(redis_url)?;
        let conn = client.get_multiplexed_tokio_connection().await?;
        info!("Redis token store ready");
        Ok(Self { conn })
    }
}

fn key(token: &str) -> String {
    format!("{KEY_PREFIX}{token}")
}

fn retention_secs(record: &TokenRecord) -> i64 {
    let lifetime = record.expires_at - record.created_at;
    (lifetime + Duration::days(RETENTION_GRACE_DAYS))
        .num_seconds()
        .max(1)
}

/// Rewrites an existing key only (`XX`) and keeps its expiry, so a record evicted
/// between the read and the write is never recreated without a TTL.
fn overwrite_cmd(token: &str, payload: &str) -> redis::Cmd {
    let mut cmd = redis::cmd("SET");
    cmd.arg(key(token)).arg(payload).arg("XX").arg("KEEPTTL");
    cmd
}

#[async_trait]
impl TokenStore for RedisTokenStore {
    async fn insert(&self, record: TokenRecord) -> Result<(), TokenStoreError> {
        let payload = serde_json::to_string(&record)?;
        let mut conn = self.conn.clone();
        redis::cmd("SET")
            .arg(key(&record.token))
            .arg(payload)
            .arg("EX")
            .arg(retention_secs(&record))
            .query_async::<_, ()>(&mut conn)
            .await?;
        Ok(())
    }

    async fn get(&self, token: &str) -> Result<Option<TokenRecord>, TokenStoreError> {
        let mut conn = self.conn.clone();
        let payload: Option<String> = redis::cmd("GET")
            .arg(key(token))
            .query_async(&mut conn)
            .await?;
        match payload {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    async fn remove(&self, token: &str) -> Result<(), TokenStoreError> {
        let mut conn = self.conn.clone();
        redis::cmd("DEL")
            .arg(key(token))
            .query_async::<_, ()>(&mut conn)
            .await?;
        Ok(())
    }

    async fn mark_used(&self, token: &str) -> Result<bool, TokenStoreError> {
        let Some(mut record) = self.get(token).await? else {
            return Ok(false);
        };
        record.used = true;
        let payload = serde_json::to_string(&record)?;
        let mut conn = self.conn.clone();
        let reply: Option<String> = overwrite_cmd(token, &payload)
            .query_async(&mut conn)
            .await?;
        Ok(reply.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_keys_are_namespaced() {
        assert_eq!(key("abc"), "profile-token:abc");
    }

    #[test]
    fn test_overwrite_only_touches_existing_keys_and_keeps_ttl() {
        let packed = overwrite_cmd("abc", "{}").get_packed_command();
        let text = String::from_utf8(packed).unwrap();
        assert!(text.contains("profile-token:abc"));
        assert!(text.contains("\r\nXX\r\n"));
        assert!(text.contains("\r\nKEEPTTL\r\n"));
        assert!(!text.contains("\r\nEX\r\n"));
    }

    #[test]
    fn test_retention_covers_ttl_plus_grace() {
        let now = Utc::now();
        let record = TokenRecord {
            token: "abc".to_string(),
            recipient_email: "dan@example.com".to_string(),
            created_at: now,
            expires_at: now + Duration::hours(24),
            used: false,
        };
        assert_eq!(retention_secs(&record), (24 + 7 * 24) * 3600);
    }
}

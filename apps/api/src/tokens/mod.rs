//! Token Registry — issues and validates the 24-hour links that gate the profile form.
//!
//! The registry owns the expiry rules; storage is a pluggable `TokenStore`
//! (`InMemoryTokenStore` for a single long-running server, `RedisTokenStore`
//! when every instance must see the same tokens). Expiry is checked lazily on
//! access against the injected `Clock`; nothing sweeps in the background.

pub mod memory;
pub mod redis_store;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Duration;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::clock::Clock;
use crate::models::token::TokenRecord;

pub use memory::InMemoryTokenStore;
pub use redis_store::RedisTokenStore;

pub const TOKEN_TTL_HOURS: i64 = 24;

#[derive(Debug, Error)]
pub enum TokenStoreError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Token record codec error: {0}")]
    Codec(#[from] serde_json::Error),
}

/// Keyed storage for token records. Implementations only store; they never
/// decide whether a record has expired.
#[async_trait]
pub trait TokenStore: Send + Sync {
    async fn insert(&self, record: TokenRecord) -> Result<(), TokenStoreError>;

    async fn get(&self, token: &str) -> Result<Option<TokenRecord>, TokenStoreError>;

    async fn remove(&self, token: &str) -> Result<(), TokenStoreError>;

    /// Sets `used = true`. Returns false when no record exists.
    async fn mark_used(&self, token: &str) -> Result<bool, TokenStoreError>;
}

/// Outcome of validating a token.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenStatus {
    Valid(TokenRecord),
    /// The record existed but its TTL had passed; it has now been evicted.
    Expired,
    Unknown,
}

#[derive(Clone)]
pub struct TokenRegistry {
    store: Arc<dyn TokenStore>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
}

impl TokenRegistry {
    pub fn new(store: Arc<dyn TokenStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            ttl: Duration::hours(TOKEN_TTL_HOURS),
        }
    }

    /// Issues a fresh random token for `recipient_email`.
    pub async fn issue(&self, recipient_email: &str) -> Result<TokenRecord, TokenStoreError> {
        let now = self.clock.now();
        let record = TokenRecord {
            token: Uuid::new_v4().to_string(),
            recipient_email: recipient_email.to_string(),
            created_at: now,
            expires_at: now + self.ttl,
            used: false,
        };
        self.store.insert(record.clone()).await?;
        info!(
            "Issued token {} for {} (expires {})",
            record.token, record.recipient_email, record.expires_at
        );
        Ok(record)
    }

    /// Validates a token, evicting it when it has expired.
    pub async fn check(&self, token: &str) -> Result<TokenStatus, TokenStoreError> {
        if token.is_empty() {
            return Ok(TokenStatus::Unknown);
        }
        let Some(record) = self.store.get(token).await? else {
            return Ok(TokenStatus::Unknown);
        };
        if record.is_expired_at(self.clock.now()) {
            self.store.remove(token).await?;
            info!("Evicted expired token {token}");
            return Ok(TokenStatus::Expired);
        }
        Ok(TokenStatus::Valid(record))
    }

    /// Returns the record for a live token. Expired and unknown tokens both yield `None`.
    #[allow(dead_code)]
    pub async fn lookup(&self, token: &str) -> Result<Option<TokenRecord>, TokenStoreError> {
        Ok(match self.check(token).await? {
            TokenStatus::Valid(record) => Some(record),
            TokenStatus::Expired | TokenStatus::Unknown => None,
        })
    }

    /// Records that a submission was made with this token. Does not block reuse.
    pub async fn mark_used(&self, token: &str) -> Result<(), TokenStoreError> {
        self.store.mark_used(token).await?;
        Ok(())
    }

    #[allow(dead_code)]
    pub async fn evict(&self, token: &str) -> Result<(), TokenStoreError> {
        self.store.remove(token).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use std::collections::HashSet;

    fn registry() -> (TokenRegistry, Arc<ManualClock>, Arc<InMemoryTokenStore>) {
        let clock = Arc::new(ManualClock::new());
        let store = Arc::new(InMemoryTokenStore::new());
        let registry = TokenRegistry::new(store.clone(), clock.clone());
        (registry, clock, store)
    }

    #[tokio::test]
    async fn test_lookup_after_issue_returns_same_recipient_and_24h_expiry() {
        let (registry, _, _) = registry();
        let issued = registry.issue("alice@example.com").await.unwrap();

        let found = registry.lookup(&issued.token).await.unwrap().unwrap();
        assert_eq!(found.recipient_email, "alice@example.com");
        assert_eq!(found.expires_at - found.created_at, Duration::hours(24));
        assert!(!found.used);
    }

    #[tokio::test]
    async fn test_issued_tokens_are_unique() {
        let (registry, _, _) = registry();
        let mut seen = HashSet::new();
        for _ in 0..100 {
            let record = registry.issue("bob@example.com").await.unwrap();
            assert!(seen.insert(record.token));
        }
    }

    #[tokio::test]
    async fn test_token_valid_at_exact_expiry_instant() {
        let (registry, clock, _) = registry();
        let issued = registry.issue("alice@example.com").await.unwrap();
        clock.advance(Duration::hours(24));
        assert!(registry.lookup(&issued.token).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_expired_token_is_evicted_and_stays_not_found() {
        let (registry, clock, store) = registry();
        let issued = registry.issue("alice@example.com").await.unwrap();
        clock.advance(Duration::hours(24) + Duration::seconds(1));

        assert!(registry.lookup(&issued.token).await.unwrap().is_none());
        assert!(store.get(&issued.token).await.unwrap().is_none());
        assert!(registry.lookup(&issued.token).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_check_distinguishes_expired_from_unknown() {
        let (registry, clock, _) = registry();
        let issued = registry.issue("alice@example.com").await.unwrap();
        clock.advance(Duration::hours(25));

        assert_eq!(
            registry.check(&issued.token).await.unwrap(),
            TokenStatus::Expired
        );
        // Evicted by the first check, so now it is simply unknown.
        assert_eq!(
            registry.check(&issued.token).await.unwrap(),
            TokenStatus::Unknown
        );
    }

    #[tokio::test]
    async fn test_never_issued_token_is_not_found() {
        let (registry, _, _) = registry();
        assert!(registry.lookup("no-such-token").await.unwrap().is_none());
        assert_eq!(registry.check("").await.unwrap(), TokenStatus::Unknown);
    }

    #[tokio::test]
    async fn test_mark_used_does_not_block_lookup() {
        let (registry, _, _) = registry();
        let issued = registry.issue("alice@example.com").await.unwrap();
        registry.mark_used(&issued.token).await.unwrap();

        let found = registry.lookup(&issued.token).await.unwrap().unwrap();
        assert!(found.used);
    }

    #[tokio::test]
    async fn test_mark_used_on_unknown_token_is_a_no_op() {
        let (registry, _, _) = registry();
        registry.mark_used("ghost").await.unwrap();
        assert!(registry.lookup("ghost").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_evict_removes_live_token() {
        let (registry, _, _) = registry();
        let issued = registry.issue("alice@example.com").await.unwrap();
        registry.evict(&issued.token).await.unwrap();
        assert_eq!(
            registry.check(&issued.token).await.unwrap(),
            TokenStatus::Unknown
        );
    }
}

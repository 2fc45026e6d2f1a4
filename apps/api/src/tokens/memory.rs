use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::models::token::TokenRecord;
use crate::tokens::{TokenStore, TokenStoreError};

/// Process-local token map. Lost on restart.
#[derive(Default)]
pub struct InMemoryTokenStore {
    records: RwLock<HashMap<String, TokenRecord>>,
}

impl InMemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TokenStore for InMemoryTokenStore {
    async fn insert(&self, record: TokenRecord) -> Result<(), TokenStoreError> {
        self.records
            .write()
            .await
            .insert(record.token.clone(), record);
        Ok(())
    }

    async fn get(&self, token: &str) -> Result<Option<TokenRecord>, TokenStoreError> {
        Ok(self.records.read().await.get(token).cloned())
    }

    async fn remove(&self, token: &str) -> Result<(), TokenStoreError> {
        self.records.write().await.remove(token);
        Ok(())
    }

    async fn mark_used(&self, token: &str) -> Result<bool, TokenStoreError> {
        Ok(match self.records.write().await.get_mut(token) {
            Some(record) => {
                record.used = true;
                true
            }
            None => false,
        })
    }
}

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::profile::{ProfileFields, ProfileRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Created,
    Updated,
}

/// The persisted profile collection.
///
/// `upsert` must decide insert-vs-update atomically per token: two racing
/// calls for one token end with exactly one record.
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    async fn upsert(
        &self,
        token: &str,
        fields: ProfileFields,
        now: DateTime<Utc>,
    ) -> Result<(ProfileRecord, UpsertOutcome), AppError>;

    /// All records, newest `submitted_at` first.
    async fn list(&self) -> Result<Vec<ProfileRecord>, AppError>;

    async fn get_by_id(&self, profile_id: Uuid) -> Result<Option<ProfileRecord>, AppError>;
}

/// Records keyed by token; the write lock spans the whole find-or-create.
#[derive(Default)]
pub struct InMemoryProfileRepository {
    by_token: RwLock<HashMap<String, ProfileRecord>>,
}

impl InMemoryProfileRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProfileRepository for InMemoryProfileRepository {
    async fn upsert(
        &self,
        token: &str,
        fields: ProfileFields,
        now: DateTime<Utc>,
    ) -> Result<(ProfileRecord, UpsertOutcome), AppError> {
        let mut by_token = self.by_token.write().await;
        match by_token.get_mut(token) {
            Some(existing) => {
                existing.overwrite(fields, now);
                Ok((existing.clone(), UpsertOutcome::Updated))
            }
            None => {
                let record = ProfileRecord::new(token, fields, now);
                by_token.insert(token.to_string(), record.clone());
                Ok((record, UpsertOutcome::Created))
            }
        }
    }

    async fn list(&self) -> Result<Vec<ProfileRecord>, AppError> {
        let mut records: Vec<ProfileRecord> =
            self.by_token.read().await.values().cloned().collect();
        records.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));
        Ok(records)
    }

    async fn get_by_id(&self, profile_id: Uuid) -> Result<Option<ProfileRecord>, AppError> {
        Ok(self
            .by_token
            .read()
            .await
            .values()
            .find(|r| r.profile_id == profile_id)
            .cloned())
    }
}

//! Profile Store — validates submissions and keeps exactly one profile per token.

pub mod handlers;
pub mod postgres;
pub mod repository;
pub mod submission;

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use crate::clock::Clock;
use crate::errors::AppError;
use crate::models::profile::ProfileRecord;

pub use postgres::PgProfileRepository;
pub use repository::{InMemoryProfileRepository, ProfileRepository, UpsertOutcome};
pub use submission::{ProfileSubmission, ValidSubmission};

#[derive(Clone)]
pub struct ProfileStore {
    repo: Arc<dyn ProfileRepository>,
    clock: Arc<dyn Clock>,
}

impl ProfileStore {
    pub fn new(repo: Arc<dyn ProfileRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { repo, clock }
    }

    /// Creates the profile for this token, or overwrites the one already there.
    pub async fn submit(&self, submission: ValidSubmission) -> Result<ProfileRecord, AppError> {
        let ValidSubmission { token, fields } = submission;
        let (record, outcome) = self.repo.upsert(&token, fields, self.clock.now()).await?;
        match outcome {
            UpsertOutcome::Created => {
                info!("Created profile {} for token {token}", record.profile_id)
            }
            UpsertOutcome::Updated => {
                info!("Updated profile {} for token {token}", record.profile_id)
            }
        }
        Ok(record)
    }

    pub async fn list(&self) -> Result<Vec<ProfileRecord>, AppError> {
        self.repo.list().await
    }

    pub async fn get_by_id(&self, profile_id: Uuid) -> Result<ProfileRecord, AppError> {
        self.repo
            .get_by_id(profile_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Profile {profile_id} not found")))
    }
}

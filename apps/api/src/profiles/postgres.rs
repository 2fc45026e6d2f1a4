use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::profile::{ProfileFields, ProfileRecord, ProfileRow};
use crate::profiles::repository::{ProfileRepository, UpsertOutcome};

pub struct PgProfileRepository {
    pool: PgPool,
}

impl PgProfileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct UpsertRow {
    #[sqlx(flatten)]
    profile: ProfileRow,
    inserted: bool,
}

#[async_trait]
impl ProfileRepository for PgProfileRepository {
    /// Single statement upsert; `UNIQUE (token)` makes find-or-create atomic.
    /// `xmax = 0` is true only for a freshly inserted tuple.
    async fn upsert(
        &self,
        token: &str,
        fields: ProfileFields,
        now: DateTime<Utc>,
    ) -> Result<(ProfileRecord, UpsertOutcome), AppError> {
        let row: UpsertRow = sqlx::query_as(
            r#"
            INSERT INTO profiles
                (profile_id, token, personal_info, professional_info, additional_info,
                 email_sent_to, submitted_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
            ON CONFLICT (token) DO UPDATE SET
                personal_info = EXCLUDED.personal_info,
                professional_info = EXCLUDED.professional_info,
                additional_info = EXCLUDED.additional_info,
                email_sent_to = EXCLUDED.email_sent_to,
                updated_at = EXCLUDED.updated_at
            RETURNING profile_id, token, personal_info, professional_info, additional_info,
                      email_sent_to, submitted_at, updated_at, (xmax = 0) AS inserted
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(token)
        .bind(Json(&fields.personal_info))
        .bind(Json(&fields.professional_info))
        .bind(Json(&fields.additional_info))
        .bind(&fields.email_sent_to)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        let outcome = if row.inserted {
            UpsertOutcome::Created
        } else {
            UpsertOutcome::Updated
        };
        Ok((row.profile.into(), outcome))
    }

    async fn list(&self) -> Result<Vec<ProfileRecord>, AppError> {
        let rows = sqlx::query_as::<_, ProfileRow>(
            "SELECT * FROM profiles ORDER BY submitted_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(ProfileRecord::from).collect())
    }

    async fn get_by_id(&self, profile_id: Uuid) -> Result<Option<ProfileRecord>, AppError> {
        let row = sqlx::query_as::<_, ProfileRow>("SELECT * FROM profiles WHERE profile_id = $1")
            .bind(profile_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(ProfileRecord::from))
    }
}

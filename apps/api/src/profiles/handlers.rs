use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::errors::AppError;
use crate::models::profile::ProfileRecord;
use crate::profiles::ProfileSubmission;
use crate::state::AppState;
use crate::tokens::TokenStatus;

/// Tokens with this prefix skip the registry check even in strict mode.
pub const TEST_TOKEN_PREFIX: &str = "test-";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionSummary {
    pub full_name: String,
    pub company_status: String,
    pub current_role: String,
    pub company: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitProfileResponse {
    pub success: bool,
    pub message: String,
    pub profile_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub data: SubmissionSummary,
}

#[derive(Debug, Serialize)]
pub struct ProfileListResponse {
    pub success: bool,
    pub count: usize,
    pub profiles: Vec<ProfileRecord>,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub success: bool,
    pub profile: ProfileRecord,
}

fn bypasses_registry(config: &Config, token: &str) -> bool {
    config.accept_unregistered_tokens || token.starts_with(TEST_TOKEN_PREFIX)
}

fn or_not_specified(value: &str) -> String {
    if value.is_empty() {
        "Not specified".to_string()
    } else {
        value.to_string()
    }
}

/// POST /api/update-profile
pub async fn handle_update_profile(
    State(state): State<AppState>,
    payload: Result<Json<ProfileSubmission>, JsonRejection>,
) -> Result<Json<SubmitProfileResponse>, AppError> {
    let Json(req) = payload?;
    let mut submission = req.validate()?;

    let registered = match state.tokens.check(&submission.token).await? {
        TokenStatus::Valid(record) => {
            submission.fill_missing_email(&record.recipient_email);
            true
        }
        TokenStatus::Expired if !bypasses_registry(&state.config, &submission.token) => {
            return Err(AppError::Expired("Profile link has expired".to_string()));
        }
        TokenStatus::Unknown if !bypasses_registry(&state.config, &submission.token) => {
            return Err(AppError::NotFound(
                "Invalid or expired profile link".to_string(),
            ));
        }
        TokenStatus::Expired | TokenStatus::Unknown => {
            info!(
                "Accepting submission for unregistered token {}",
                submission.token
            );
            false
        }
    };

    let record = state.profiles.submit(submission).await?;
    if registered {
        // The profile is already stored; a failed flag update must not fail the request.
        if let Err(e) = state.tokens.mark_used(&record.token).await {
            warn!("Failed to mark token {} as used: {e}", record.token);
        }
    }

    let professional = &record.professional_info;
    Ok(Json(SubmitProfileResponse {
        success: true,
        message: "Profile information submitted successfully".to_string(),
        profile_id: record.profile_id,
        timestamp: record.submitted_at,
        data: SubmissionSummary {
            full_name: record.personal_info.full_name.clone(),
            company_status: professional.company_status.as_str().to_string(),
            current_role: or_not_specified(&professional.current_position),
            company: or_not_specified(&professional.company_name),
        },
    }))
}

/// GET /api/profiles
pub async fn handle_list_profiles(
    State(state): State<AppState>,
) -> Result<Json<ProfileListResponse>, AppError> {
    let profiles = state.profiles.list().await?;
    Ok(Json(ProfileListResponse {
        success: true,
        count: profiles.len(),
        profiles,
    }))
}

/// GET /api/profiles/:id
pub async fn handle_get_profile(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ProfileResponse>, AppError> {
    let profile_id = Uuid::parse_str(&id)
        .map_err(|_| AppError::NotFound(format!("Profile {id} not found")))?;
    let profile = state.profiles.get_by_id(profile_id).await?;
    Ok(Json(ProfileResponse {
        success: true,
        profile,
    }))
}

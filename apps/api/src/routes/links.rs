use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{header, HeaderMap},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

use crate::config::Config;
use crate::errors::AppError;
use crate::mail::templates::{invitation_email, InvitationContext};
use crate::state::AppState;
use crate::tokens::TokenStatus;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendLinkRequest {
    pub recipient_email: Option<String>,
    pub sender_name: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SendLinkResponse {
    pub success: bool,
    pub message: String,
    pub token: String,
}

/// Public URL of a token's profile form. Prefers the configured origin, then the
/// request's forwarded scheme and `Host` header.
pub fn profile_link(config: &Config, headers: &HeaderMap, token: &str) -> String {
    let origin = match &config.public_base_url {
        Some(base) => base.clone(),
        None => {
            let scheme = headers
                .get("x-forwarded-proto")
                .and_then(|v| v.to_str().ok())
                .unwrap_or("http");
            let host = headers
                .get(header::HOST)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
                .unwrap_or_else(|| format!("localhost:{}", config.port));
            format!("{scheme}://{host}")
        }
    };
    format!("{origin}/profile/{token}")
}

/// POST /send-upload-link
pub async fn handle_send_link(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<SendLinkRequest>, JsonRejection>,
) -> Result<Json<SendLinkResponse>, AppError> {
    let Json(req) = payload?;
    let recipient = req
        .recipient_email
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::Validation("Recipient email is required".to_string()))?;

    let record = state.tokens.issue(recipient).await?;
    let link = profile_link(&state.config, &headers, &record.token);

    let email = invitation_email(
        recipient,
        &link,
        &InvitationContext {
            sender_name: req.sender_name.as_deref(),
            message: req.message.as_deref(),
        },
    );
    state.mailer.send(&email).await?;
    info!("Sent profile link to {recipient}");

    Ok(Json(SendLinkResponse {
        success: true,
        message: "Profile link sent successfully".to_string(),
        token: record.token,
    }))
}

/// GET /status/:token
pub async fn handle_status(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Json<Value>, AppError> {
    let body = match state.tokens.check(&token).await? {
        TokenStatus::Valid(record) => json!({
            "valid": true,
            "expiresAt": record.expires_at,
            "recipientEmail": record.recipient_email,
        }),
        TokenStatus::Expired => json!({ "valid": false, "message": "Token expired" }),
        TokenStatus::Unknown => json!({ "valid": false, "message": "Invalid token" }),
    };
    Ok(Json(body))
}

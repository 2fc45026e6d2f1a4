use std::sync::atomic::{AtomicBool, Ordering};

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

use crate::mail::MailError;
use crate::tokens::TokenStoreError;

/// Set once at startup from `APP_ENV`. When false, 5xx bodies carry no detail string.
static EXPOSE_DETAILS: AtomicBool = AtomicBool::new(false);

pub fn expose_error_details(enabled: bool) {
    EXPOSE_DETAILS.store(enabled, Ordering::Relaxed);
}

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Expired: {0}")]
    Expired(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Token store error: {0}")]
    TokenStore(#[from] TokenStoreError),

    #[error("Mail error: {0}")]
    Mail(#[from] MailError),
}

impl AppError {
    /// Status, machine code, public message, and the private detail (if any).
    fn parts(&self) -> (StatusCode, &'static str, String, Option<String>) {
        match self {
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone(), None)
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone(), None),
            AppError::Expired(msg) => (StatusCode::GONE, "EXPIRED", msg.clone(), None),
            AppError::Database(e) if is_unique_violation(e) => (
                StatusCode::CONFLICT,
                "CONFLICT",
                "A concurrent submission already claimed this record".to_string(),
                Some(e.to_string()),
            ),
            AppError::Database(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "DATABASE_ERROR",
                "A database error occurred".to_string(),
                Some(e.to_string()),
            ),
            AppError::TokenStore(e) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "TOKEN_STORE_UNAVAILABLE",
                "The token store is unavailable".to_string(),
                Some(e.to_string()),
            ),
            AppError::Mail(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "MAIL_ERROR",
                "Failed to send email".to_string(),
                Some(e.to_string()),
            ),
        }
    }
}

/// Malformed or mistyped request bodies answer like any other validation failure.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    e.as_database_error()
        .map(|db| db.is_unique_violation())
        .unwrap_or(false)
}

fn error_body(code: &str, message: &str, details: Option<&str>, expose: bool) -> Value {
    let mut error = json!({
        "code": code,
        "message": message,
    });
    if let (true, Some(details)) = (expose, details) {
        error["details"] = Value::String(details.to_string());
    }
    json!({
        "success": false,
        "error": error,
    })
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, details) = self.parts();

        if status.is_server_error() {
            tracing::error!("{code}: {self:?}");
        }

        let body = error_body(
            code,
            &message,
            details.as_deref(),
            EXPOSE_DETAILS.load(Ordering::Relaxed),
        );

        (status, Json(body)).into_response()
    }
}

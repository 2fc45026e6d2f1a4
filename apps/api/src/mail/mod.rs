//! Outbound email. Handlers only see the `Mailer` trait; the transport is chosen at startup.

pub mod templates;

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::MailConfig;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Mail API rejected message (status {status}): {message}")]
    Rejected { status: u16, message: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub html: String,
    pub text: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError>;
}

/// Development fallback: logs the message instead of delivering it.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError> {
        info!(
            "Mail transport not configured; would send '{}' to {}:\n{}",
            email.subject, email.to, email.text
        );
        Ok(())
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Address<'a> {
    email: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SendRequest<'a> {
    sender: Address<'a>,
    to: Vec<Address<'a>>,
    subject: &'a str,
    html_content: &'a str,
    text_content: &'a str,
}

/// Sends through a transactional-mail HTTP API (Brevo-style JSON payload, `api-key` header).
pub struct HttpMailer {
    client: Client,
    api_url: String,
    api_key: String,
    from_email: String,
    from_name: Option<String>,
}

impl HttpMailer {
    /// Returns `None` when the config lacks a URL, key or sender.
    pub fn from_config(config: &MailConfig) -> Result<Option<Self>> {
        let (Some(api_url), Some(api_key), Some(from_email)) = (
            config.api_url.clone(),
            config.api_key.clone(),
            config.from_email.clone(),
        ) else {
            return Ok(None);
        };

        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;

        Ok(Some(Self {
            client,
            api_url,
            api_key,
            from_email,
            from_name: config.from_name.clone(),
        }))
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError> {
        let body = SendRequest {
            sender: Address {
                email: &self.from_email,
                name: self.from_name.as_deref(),
            },
            to: vec![Address {
                email: &email.to,
                name: None,
            }],
            subject: &email.subject,
            html_content: &email.html,
            text_content: &email.text,
        };

        let response = self
            .client
            .post(&self.api_url)
            .header("api-key", &self.api_key)
            .header("accept", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(MailError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        debug!("Mail API accepted message to {}", email.to);
        Ok(())
    }
}

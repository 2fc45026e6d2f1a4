use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Only the listener and log level have hard defaults; every backend falls back
/// to an in-process implementation when its URL is absent.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub app_env: String,
    pub database_url: Option<String>,
    pub redis_url: Option<String>,
    pub public_base_url: Option<String>,
    /// Accept submissions for tokens the registry has never seen (or has expired).
    pub accept_unregistered_tokens: bool,
    pub mail: MailConfig,
}

#[derive(Debug, Clone, Default)]
pub struct MailConfig {
    pub api_url: Option<String>,
    pub api_key: Option<String>,
    pub from_email: Option<String>,
    pub from_name: Option<String>,
}

impl MailConfig {
    /// The HTTP mailer needs an endpoint, a key and a sender; anything less means log-only.
    pub fn is_configured(&self) -> bool {
        self.api_url.is_some() && self.api_key.is_some() && self.from_email.is_some()
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            app_env: std::env::var("APP_ENV").unwrap_or_else(|_| "production".to_string()),
            database_url: optional_env("DATABASE_URL"),
            redis_url: optional_env("REDIS_URL"),
            public_base_url: optional_env("PUBLIC_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string()),
            accept_unregistered_tokens: parse_flag("ACCEPT_UNREGISTERED_TOKENS", true)?,
            mail: MailConfig {
                api_url: optional_env("MAIL_API_URL"),
                api_key: optional_env("MAIL_API_KEY"),
                from_email: optional_env("MAIL_FROM"),
                from_name: optional_env("MAIL_FROM_NAME"),
            },
        })
    }

    pub fn is_development(&self) -> bool {
        self.app_env.eq_ignore_ascii_case("development")
    }
}

/// Reads a variable, treating unset and blank the same way.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_flag(key: &str, default: bool) -> Result<bool> {
    match optional_env(key) {
        None => Ok(default),
        Some(raw) => parse_bool(&raw)
            .with_context(|| format!("Environment variable '{key}' must be a boolean, got '{raw}'")),
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
impl Config {
    /// In-memory everything, lax token policy, development error details.
    pub fn for_tests() -> Self {
        Config {
            port: 0,
            rust_log: "debug".to_string(),
            app_env: "development".to_string(),
            database_url: None,
            redis_url: None,
            public_base_url: Some("https://profiles.example.com".to_string()),
            accept_unregistered_tokens: true,
            mail: MailConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bool_accepts_common_spellings() {
        assert_eq!(parse_bool("TRUE"), Some(true));
        assert_eq!(parse_bool("on"), Some(true));
        assert_eq!(parse_bool("0"), Some(false));
        assert_eq!(parse_bool("No"), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }

    #[test]
    fn test_mail_config_requires_url_key_and_sender() {
        let mut mail = MailConfig {
            api_url: Some("https://mail.example.com/send".to_string()),
            api_key: Some("key".to_string()),
            from_email: None,
            from_name: None,
        };
        assert!(!mail.is_configured());
        mail.from_email = Some("noreply@example.com".to_string());
        assert!(mail.is_configured());
    }

    #[test]
    fn test_development_mode_is_case_insensitive() {
        let mut config = Config::for_tests();
        config.app_env = "Development".to_string();
        assert!(config.is_development());
        config.app_env = "production".to_string();
        assert!(!config.is_development());
    }
}

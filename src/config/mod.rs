//! Configuration module for the Rotabot backend.
//!
//! All configuration is loaded from environment variables with sensible defaults.
//! Slack credentials have no default and must be provided.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

/// Default Slack Web API base URL.
pub const DEFAULT_SLACK_API_BASE: &str = "https://slack.com/api";

/// Errors raised while reading the environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Output format of log entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl LogFormat {
    fn parse(s: &str) -> Result<Self, ConfigError> {
        match s {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(ConfigError::Invalid {
                name: "ROTABOT_LOG_FORMAT",
                reason: format!("expected 'pretty' or 'json', got '{}'", other),
            }),
        }
    }
}

/// Application configuration loaded from environment variables.
#[derive(Clone)]
pub struct Config {
    /// Secret shared with Slack used to sign inbound requests
    pub signing_secret: String,
    /// Bot token used to call the Slack Web API (`xoxb-*`)
    pub bot_token: String,
    /// Base URL of the Slack Web API
    pub slack_api_base: String,
    /// Path to SQLite database file
    pub db_path: PathBuf,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Log output format
    pub log_format: LogFormat,
    /// Sentry DSN; error reporting is disabled when absent
    pub sentry_dsn: Option<String>,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("signing_secret", &"[REDACTED]")
            .field("bot_token", &"[REDACTED]")
            .field("slack_api_base", &self.slack_api_base)
            .field("db_path", &self.db_path)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("log_format", &self.log_format)
            .field("sentry_dsn", &self.sentry_dsn.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let signing_secret = required("SLACK_SIGNING_SECRET")?;
        let bot_token = required("SLACK_CLIENT_SECRET")?;

        let slack_api_base =
            env::var("SLACK_API_BASE").unwrap_or_else(|_| DEFAULT_SLACK_API_BASE.to_string());

        let db_path = env::var("ROTABOT_DB_PATH")
            .unwrap_or_else(|_| "./data/rotabot.sqlite".to_string())
            .into();

        let bind_addr = env::var("ROTABOT_BIND_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:8080".to_string())
            .parse()
            .map_err(|e: std::net::AddrParseError| ConfigError::Invalid {
                name: "ROTABOT_BIND_ADDR",
                reason: e.to_string(),
            })?;

        let log_level = env::var("ROTABOT_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let log_format = match env::var("ROTABOT_LOG_FORMAT") {
            Ok(s) => LogFormat::parse(&s)?,
            Err(_) => LogFormat::Json,
        };

        let sentry_dsn = env::var("ROTABOT_SENTRY_DSN")
            .ok()
            .filter(|s| !s.trim().is_empty());

        Ok(Self {
            signing_secret,
            bot_token,
            slack_api_base,
            db_path,
            bind_addr,
            log_level,
            log_format,
            sentry_dsn,
        })
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    env::var(name)
        .ok()
        .filter(|s| !s.is_empty())
        .ok_or(ConfigError::Missing(name))
}

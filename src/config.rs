use chrono::NaiveTime;
use chrono_tz::Tz;
use serde::Deserialize;
use std::fmt;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use teloxide::types::ChatId;
use url::Url;

use crate::quiet::{parse_time_of_day, QuietConfig};

/// Environment variable consulted when the config file has no token.
pub const TOKEN_ENV_VAR: &str = "TELEGRAM_BOT_TOKEN";

const DEFAULT_REMINDER_TEXT: &str = "🌙 Shhh... It’s quiet hours in this chat right now.";

/// Errors that can occur when loading configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to read the config file.
    ReadFile { path: PathBuf, source: std::io::Error },
    /// Failed to parse JSON.
    ParseJson { path: PathBuf, source: serde_json::Error },
    /// A time-of-day field is not "HH:MM" or "HH:MM:SS".
    InvalidTime { field: &'static str, value: String },
    /// Unknown IANA timezone name.
    InvalidTimezone(String),
    /// Webhook URL or listen address could not be parsed.
    InvalidWebhook(String),
    /// Validation error.
    Validation(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReadFile { path, source } => {
                write!(f, "failed to read config file '{}': {}", path.display(), source)
            }
            Self::ParseJson { path, source } => {
                write!(f, "failed to parse config file '{}': {}", path.display(), source)
            }
            Self::InvalidTime { field, value } => {
                write!(f, "invalid {} '{}' (expected HH:MM or HH:MM:SS)", field, value)
            }
            Self::InvalidTimezone(name) => write!(f, "unknown timezone '{}'", name),
            Self::InvalidWebhook(msg) => write!(f, "invalid webhook settings: {}", msg),
            Self::Validation(msg) => write!(f, "config validation error: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ReadFile { source, .. } => Some(source),
            Self::ParseJson { source, .. } => Some(source),
            _ => None,
        }
    }
}

#[derive(Deserialize)]
struct WebhookFile {
    /// Public HTTPS URL Telegram posts updates to.
    url: String,
    #[serde(default = "default_listen_addr")]
    listen_addr: String,
}

#[derive(Deserialize)]
struct ConfigFile {
    /// Falls back to $TELEGRAM_BOT_TOKEN when empty.
    #[serde(default)]
    telegram_bot_token: String,
    #[serde(default = "default_timezone")]
    timezone: String,
    #[serde(default = "default_quiet_start")]
    quiet_start: String,
    #[serde(default = "default_quiet_end")]
    quiet_end: String,
    #[serde(default = "default_min_reminder_interval_secs")]
    min_reminder_interval_secs: u64,
    /// May contain `{start}` and `{end}` placeholders.
    #[serde(default = "default_reminder_text")]
    reminder_text: String,
    #[serde(default)]
    dry_run: bool,
    log_chat_id: Option<i64>,
    /// Directory for state files (logs). Defaults to current directory.
    data_dir: Option<String>,
    /// Receive updates via webhook instead of long polling.
    webhook: Option<WebhookFile>,
}

fn default_timezone() -> String {
    "Asia/Tbilisi".to_string()
}

fn default_quiet_start() -> String {
    "19:00".to_string()
}

fn default_quiet_end() -> String {
    "08:00".to_string()
}

fn default_min_reminder_interval_secs() -> u64 {
    300
}

fn default_reminder_text() -> String {
    DEFAULT_REMINDER_TEXT.to_string()
}

fn default_listen_addr() -> String {
    "0.0.0.0:8443".to_string()
}

/// How updates reach the bot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transport {
    Polling,
    Webhook { url: Url, listen_addr: SocketAddr },
}

pub struct Config {
    pub telegram_bot_token: String,
    pub timezone: Tz,
    pub quiet_start: NaiveTime,
    pub quiet_end: NaiveTime,
    /// Minimum seconds between two reminders in the same chat.
    pub min_reminder_interval_secs: u64,
    pub reminder_text: String,
    pub dry_run: bool,
    pub log_chat_id: Option<ChatId>,
    /// Directory for state files (logs).
    pub data_dir: PathBuf,
    pub transport: Transport,
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        Self::load_with_env_token(path, std::env::var(TOKEN_ENV_VAR).ok())
    }

    /// Like [`Config::load`], with the environment token passed in explicitly.
    pub fn load_with_env_token<P: AsRef<Path>>(
        path: P,
        env_token: Option<String>,
    ) -> Result<Self, ConfigError> {
        let config_path = path.as_ref().to_path_buf();
        let content = std::fs::read_to_string(&config_path)
            .map_err(|e| ConfigError::ReadFile { path: config_path.clone(), source: e })?;
        let file: ConfigFile = serde_json::from_str(&content)
            .map_err(|e| ConfigError::ParseJson { path: config_path.clone(), source: e })?;

        let telegram_bot_token = if file.telegram_bot_token.is_empty() {
            env_token.unwrap_or_default()
        } else {
            file.telegram_bot_token
        };
        validate_token(&telegram_bot_token)?;

        let timezone: Tz = file
            .timezone
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidTimezone(file.timezone.clone()))?;

        let quiet_start = parse_time_of_day(&file.quiet_start).ok_or_else(|| ConfigError::InvalidTime {
            field: "quiet_start",
            value: file.quiet_start.clone(),
        })?;
        let quiet_end = parse_time_of_day(&file.quiet_end).ok_or_else(|| ConfigError::InvalidTime {
            field: "quiet_end",
            value: file.quiet_end.clone(),
        })?;

        if file.reminder_text.trim().is_empty() {
            return Err(ConfigError::Validation("reminder_text must not be empty".into()));
        }

        let transport = match file.webhook {
            None => Transport::Polling,
            Some(webhook) => {
                let url = Url::parse(&webhook.url)
                    .map_err(|e| ConfigError::InvalidWebhook(format!("url '{}': {}", webhook.url, e)))?;
                let listen_addr = webhook.listen_addr.parse().map_err(|e| {
                    ConfigError::InvalidWebhook(format!("listen_addr '{}': {}", webhook.listen_addr, e))
                })?;
                Transport::Webhook { url, listen_addr }
            }
        };

        let data_dir = file
            .data_dir
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));

        Ok(Self {
            telegram_bot_token,
            timezone,
            quiet_start,
            quiet_end,
            min_reminder_interval_secs: file.min_reminder_interval_secs,
            reminder_text: file.reminder_text,
            dry_run: file.dry_run,
            log_chat_id: file.log_chat_id.map(ChatId),
            data_dir,
            transport,
        })
    }

    /// Settings for the decision core.
    pub fn quiet_config(&self) -> QuietConfig {
        let cooldown = i64::try_from(self.min_reminder_interval_secs)
            .ok()
            .and_then(chrono::Duration::try_seconds)
            .unwrap_or(chrono::Duration::MAX);
        QuietConfig::new(
            self.quiet_start,
            self.quiet_end,
            self.timezone,
            cooldown,
            &self.reminder_text,
        )
    }
}

// Telegram tokens are formatted as {bot_id}:{secret} where bot_id is numeric
fn validate_token(token: &str) -> Result<(), ConfigError> {
    if token.is_empty() {
        return Err(ConfigError::Validation(format!(
            "telegram_bot_token is required (or set {TOKEN_ENV_VAR})"
        )));
    }
    let token_parts: Vec<&str> = token.split(':').collect();
    if token_parts.len() != 2 || token_parts[0].parse::<u64>().is_err() || token_parts[1].is_empty() {
        return Err(ConfigError::Validation(
            "telegram_bot_token appears invalid (expected format: 123456789:ABCdefGHI...)".into(),
        ));
    }
    Ok(())
}

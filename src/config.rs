use std::{net::SocketAddr, path::PathBuf};

use dotenvy::dotenv;
use url::Url;

use crate::{error::ConfigError, sender::Destination};

pub const DEFAULT_QUIZ_FILE: &str = "quizzes.json";
pub const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookConfig {
    pub url: Url,
    pub addr: SocketAddr,
}

/// Startup parameters, read from the environment (and `.env`).
pub struct BotConfig {
    token: String,
    channels: Vec<Destination>,
    groups: Vec<Destination>,
    quiz_file: PathBuf,
    admin_name: Option<String>,
    log_level: String,
    log_format: LogFormat,
    webhook: Option<WebhookConfig>,
}

impl BotConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let token = var("TELOXIDE_TOKEN").ok_or(ConfigError::Missing("TELOXIDE_TOKEN"))?;

        let channels = var("QUIZ_CHANNELS")
            .map(|list| list.split(',').filter_map(Destination::channel).collect())
            .unwrap_or_default();
        let groups = var("QUIZ_GROUPS")
            .map(|list| list.split(',').filter_map(Destination::group).collect())
            .unwrap_or_default();

        let log_format = match var("LOG_FORMAT").as_deref().map(str::trim) {
            None | Some("pretty") => LogFormat::Pretty,
            Some("json") => LogFormat::Json,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    key: "LOG_FORMAT",
                    reason: format!("'{other}' is neither 'pretty' nor 'json'"),
                })
            }
        };

        let webhook = match (var("WEBHOOK_URL"), var("WEBHOOK_ADDR")) {
            (Some(raw_url), Some(raw_addr)) => Some(WebhookConfig {
                url: raw_url
                    .trim()
                    .parse::<Url>()
                    .map_err(|e| ConfigError::Invalid {
                        key: "WEBHOOK_URL",
                        reason: e.to_string(),
                    })?,
                addr: raw_addr
                    .trim()
                    .parse::<SocketAddr>()
                    .map_err(|e| ConfigError::Invalid {
                        key: "WEBHOOK_ADDR",
                        reason: e.to_string(),
                    })?,
            }),
            (None, None) => None,
            (Some(_), None) => return Err(ConfigError::Missing("WEBHOOK_ADDR")),
            (None, Some(_)) => return Err(ConfigError::Missing("WEBHOOK_URL")),
        };

        Ok(Self {
            token,
            channels,
            groups,
            quiz_file: var("QUIZ_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_QUIZ_FILE)),
            admin_name: var("ADMIN_NAME").map(|name| name.trim().trim_start_matches('@').to_owned()),
            log_level: var("LOG_LEVEL").unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_owned()),
            log_format,
            webhook,
        })
    }

    pub fn token(&self) -> String {
        self.token.clone()
    }

    pub fn channels(&self) -> &[Destination] {
        &self.channels
    }

    pub fn groups(&self) -> &[Destination] {
        &self.groups
    }

    pub fn quiz_file(&self) -> &PathBuf {
        &self.quiz_file
    }

    pub fn admin_name(&self) -> Option<&str> {
        self.admin_name.as_deref()
    }

    pub fn log_level(&self) -> &str {
        &self.log_level
    }

    pub fn log_format(&self) -> LogFormat {
        self.log_format
    }

    pub fn webhook(&self) -> Option<&WebhookConfig> {
        self.webhook.as_ref()
    }
}

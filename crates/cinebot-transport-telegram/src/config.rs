//! Telegram transport settings.

use cinebot_core::config::CoreSettings;
use config::ConfigError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Telegram transport settings loaded from environment variables.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct TelegramSettings {
    /// Bots served by this process: `title=token` or bare `token` entries
    /// separated by `,`, `;` or whitespace.
    #[serde(rename = "bot_tokens")]
    pub bot_tokens_str: Option<String>,
    /// Address the webhook server listens on.
    #[serde(default = "default_webhook_bind_addr")]
    pub webhook_bind_addr: String,
    /// Public base URL; when set, webhooks are registered at boot.
    pub public_url: Option<String>,
}

impl Default for TelegramSettings {
    fn default() -> Self {
        Self {
            bot_tokens_str: None,
            webhook_bind_addr: default_webhook_bind_addr(),
            public_url: None,
        }
    }
}

fn default_webhook_bind_addr() -> String {
    "0.0.0.0:8080".to_string()
}

/// A bot this process serves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotRegistration {
    /// Human-readable name used in logs.
    pub title: String,
    /// Telegram Bot API token.
    pub token: String,
}

impl BotRegistration {
    /// Registration for a token that arrived without configuration.
    ///
    /// The title is the numeric bot id, which is not secret.
    #[must_use]
    pub fn from_token(token: impl Into<String>) -> Self {
        let token = token.into();
        let title = token
            .split_once(':')
            .map_or_else(|| "bot".to_string(), |(id, _)| format!("bot{id}"));
        Self { title, token }
    }
}

/// Combined settings used by the Telegram transport layer.
#[derive(Clone)]
pub struct BotSettings {
    /// Core settings shared across transport handlers.
    pub core: Arc<CoreSettings>,
    /// Telegram-specific settings.
    pub telegram: Arc<TelegramSettings>,
}

impl BotSettings {
    /// Create a new combined settings bundle.
    #[must_use]
    pub fn new(core: CoreSettings, telegram: TelegramSettings) -> Self {
        Self {
            core: Arc::new(core),
            telegram: Arc::new(telegram),
        }
    }
}

impl TelegramSettings {
    /// Create new settings by loading from environment and files.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if loading fails.
    pub fn new() -> Result<Self, ConfigError> {
        cinebot_core::config::build_config()?.try_deserialize()
    }

    /// Returns configured bots in declaration order, skipping duplicates.
    #[must_use]
    pub fn bot_registrations(&self) -> Vec<BotRegistration> {
        let mut registrations: Vec<BotRegistration> = Vec::new();
        let entries = self
            .bot_tokens_str
            .as_deref()
            .unwrap_or_default()
            .split(|c: char| c == ',' || c == ';' || c.is_whitespace())
            .filter(|entry| !entry.is_empty());

        for entry in entries {
            let registration = match entry.split_once('=') {
                Some((title, token)) if !token.is_empty() => BotRegistration {
                    title: title.to_string(),
                    token: token.to_string(),
                },
                Some(_) => continue,
                None => BotRegistration::from_token(entry),
            };
            if !registrations.iter().any(|r| r.token == registration.token) {
                registrations.push(registration);
            }
        }
        registrations
    }

    /// Webhook URL for `token` below the configured public URL.
    #[must_use]
    pub fn webhook_url(&self, token: &str) -> Option<String> {
        self.public_url.as_deref().map(|base| {
            format!(
                "{}/telegram/webhook/{token}/",
                base.trim_end_matches('/')
            )
        })
    }
}

//! Outbound Telegram calls with automatic retry on transient failures.
//!
//! The conversation engine talks to Telegram only through [`Messenger`], so
//! tests can record outbound traffic instead of hitting the Bot API.

use async_trait::async_trait;
use cinebot_core::utils::retry_transport_operation;
use reqwest::Url;
use std::future::IntoFuture;
use teloxide::prelude::*;
use teloxide::types::{
    CallbackQueryId, ChatId, InlineKeyboardMarkup, InlineQueryId, InlineQueryResult, InputFile,
    MessageId, ParseMode,
};
use teloxide::{ApiError, RequestError};
use thiserror::Error;
use tracing::debug;

/// Why a delivery failed.
#[derive(Error, Debug)]
pub enum DeliveryError {
    /// The recipient blocked the bot
    #[error("bot was blocked by the user")]
    Blocked,
    /// Any other failure
    #[error("delivery failed: {0}")]
    Other(String),
}

/// Text message body.
#[derive(Clone, Debug, PartialEq)]
pub struct Reply {
    /// Message text
    pub text: String,
    /// Render as HTML
    pub html: bool,
    /// Inline keyboard
    pub keyboard: Option<InlineKeyboardMarkup>,
}

impl Reply {
    /// Plain text without keyboard.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            html: false,
            keyboard: None,
        }
    }

    /// HTML text without keyboard.
    #[must_use]
    pub fn html(text: impl Into<String>) -> Self {
        Self {
            html: true,
            ..Self::text(text)
        }
    }

    /// Attach a keyboard.
    #[must_use]
    pub fn with_keyboard(mut self, keyboard: InlineKeyboardMarkup) -> Self {
        self.keyboard = Some(keyboard);
        self
    }

    /// Attach a keyboard if present.
    #[must_use]
    pub fn with_optional_keyboard(mut self, keyboard: Option<InlineKeyboardMarkup>) -> Self {
        self.keyboard = keyboard;
        self
    }
}

/// Outbound Telegram operations used by the conversation.
#[async_trait]
pub trait Messenger: Send + Sync {
    /// Send a new message
    async fn send_message(&self, chat_id: ChatId, reply: Reply) -> Result<(), DeliveryError>;
    /// Replace text and keyboard of an existing message
    async fn edit_message(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
        reply: Reply,
    ) -> Result<(), DeliveryError>;
    /// Replace or (with `None`) remove the keyboard of a message
    async fn edit_keyboard(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
        keyboard: Option<InlineKeyboardMarkup>,
    ) -> Result<(), DeliveryError>;
    /// Delete a message
    async fn delete_message(&self, chat_id: ChatId, message_id: MessageId)
        -> Result<(), DeliveryError>;
    /// Send a photo by URL
    async fn send_photo(&self, chat_id: ChatId, url: &str) -> Result<(), DeliveryError>;
    /// Stop the loading indicator of a button press
    async fn answer_callback(&self, query_id: &str) -> Result<(), DeliveryError>;
    /// Answer an inline query
    async fn answer_inline(
        &self,
        query_id: &str,
        results: Vec<InlineQueryResult>,
    ) -> Result<(), DeliveryError>;
}

fn is_transient(err: &RequestError) -> bool {
    matches!(
        err,
        RequestError::Network(_) | RequestError::Io(_) | RequestError::RetryAfter(_)
    )
}

fn classify(err: RequestError) -> Result<(), DeliveryError> {
    match err {
        RequestError::Api(ApiError::BotBlocked) => Err(DeliveryError::Blocked),
        RequestError::Api(ApiError::MessageNotModified) => {
            debug!("Message update skipped: message is not modified");
            Ok(())
        }
        other => Err(DeliveryError::Other(other.to_string())),
    }
}

async fn call<F, Fut, T>(operation: F) -> Result<(), DeliveryError>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, RequestError>>,
{
    match retry_transport_operation(operation, is_transient).await {
        Ok(_) => Ok(()),
        Err(e) => classify(e),
    }
}

/// [`Messenger`] backed by the Telegram Bot API.
#[derive(Clone)]
pub struct TelegramMessenger {
    bot: Bot,
}

impl TelegramMessenger {
    /// Wrap a bot client.
    #[must_use]
    pub const fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl Messenger for TelegramMessenger {
    async fn send_message(&self, chat_id: ChatId, reply: Reply) -> Result<(), DeliveryError> {
        call(|| {
            let mut req = self.bot.send_message(chat_id, reply.text.clone());
            if reply.html {
                req = req.parse_mode(ParseMode::Html);
            }
            if let Some(keyboard) = reply.keyboard.clone() {
                req = req.reply_markup(keyboard);
            }
            req.into_future()
        })
        .await
    }

    async fn edit_message(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
        reply: Reply,
    ) -> Result<(), DeliveryError> {
        call(|| {
            let mut req = self
                .bot
                .edit_message_text(chat_id, message_id, reply.text.clone());
            if reply.html {
                req = req.parse_mode(ParseMode::Html);
            }
            if let Some(keyboard) = reply.keyboard.clone() {
                req = req.reply_markup(keyboard);
            }
            req.into_future()
        })
        .await
    }

    async fn edit_keyboard(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
        keyboard: Option<InlineKeyboardMarkup>,
    ) -> Result<(), DeliveryError> {
        call(|| {
            let mut req = self.bot.edit_message_reply_markup(chat_id, message_id);
            if let Some(keyboard) = keyboard.clone() {
                req = req.reply_markup(keyboard);
            }
            req.into_future()
        })
        .await
    }

    async fn delete_message(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
    ) -> Result<(), DeliveryError> {
        call(|| self.bot.delete_message(chat_id, message_id).into_future()).await
    }

    async fn send_photo(&self, chat_id: ChatId, url: &str) -> Result<(), DeliveryError> {
        let url = Url::parse(url).map_err(|e| DeliveryError::Other(format!("bad photo URL: {e}")))?;
        call(|| {
            self.bot
                .send_photo(chat_id, InputFile::url(url.clone()))
                .into_future()
        })
        .await
    }

    async fn answer_callback(&self, query_id: &str) -> Result<(), DeliveryError> {
        call(|| {
            self.bot
                .answer_callback_query(CallbackQueryId(query_id.to_string()))
                .into_future()
        })
        .await
    }

    async fn answer_inline(
        &self,
        query_id: &str,
        results: Vec<InlineQueryResult>,
    ) -> Result<(), DeliveryError> {
        call(|| {
            self.bot
                .answer_inline_query(InlineQueryId(query_id.to_string()), results.clone())
                .into_future()
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blocked_is_classified() {
        assert!(matches!(
            classify(RequestError::Api(ApiError::BotBlocked)),
            Err(DeliveryError::Blocked)
        ));
        assert!(classify(RequestError::Api(ApiError::MessageNotModified)).is_ok());
        assert!(matches!(
            classify(RequestError::Api(ApiError::MessageToEditNotFound)),
            Err(DeliveryError::Other(_))
        ));
    }

    #[test]
    fn test_api_errors_are_not_retried() {
        assert!(!is_transient(&RequestError::Api(ApiError::BotBlocked)));
    }

    #[test]
    fn test_reply_builders() {
        let reply = Reply::html("<b>x</b>").with_optional_keyboard(None);
        assert!(reply.html);
        assert_eq!(reply.keyboard, None);
        assert!(!Reply::text("x").html);
    }
}

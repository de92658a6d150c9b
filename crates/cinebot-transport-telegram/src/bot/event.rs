use crate::bot::actions::CallbackData;
use cinebot_core::storage::ChatUser;
use teloxide::types::{CallbackQuery, ChatId, InlineQuery, Message, MessageId, Update, UpdateKind, User};
use teloxide::utils::command::BotCommands;

/// Supported commands for the bot
#[derive(BotCommands, Clone, Copy, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "Supported commands:")]
pub enum Command {
    /// Open the movie menu
    #[command(description = "Find a movie.")]
    Movies,
    /// Alias of `/movies`
    #[command(description = "Start the bot.")]
    Start,
    /// Leave the conversation
    #[command(description = "Stop the conversation.")]
    Stop,
}

impl Command {
    /// Parse a message text, accepting the `/cmd@BotName` form.
    #[must_use]
    pub fn from_text(text: &str) -> Option<Self> {
        let head = text.split_whitespace().next()?;
        let name = head.split_once('@').map_or(head, |(name, _)| name);
        Self::parse(name, "").ok()
    }
}

/// Identity of whoever triggered an event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Sender {
    /// Telegram user id
    pub id: i64,
    /// `@username`
    pub username: Option<String>,
    /// First name
    pub first_name: String,
    /// Last name
    pub last_name: Option<String>,
    /// Client language
    pub language_code: Option<String>,
}

impl From<&User> for Sender {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.0.cast_signed(),
            username: user.username.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            language_code: user.language_code.clone(),
        }
    }
}

impl Sender {
    /// Storage record for this identity.
    #[must_use]
    pub fn to_chat_user(&self) -> ChatUser {
        ChatUser {
            user_id: self.id,
            username: self.username.clone(),
            first_name: Some(self.first_name.clone()).filter(|name| !name.is_empty()),
            last_name: self.last_name.clone(),
            language_code: self.language_code.clone(),
            ..ChatUser::default()
        }
    }
}

/// A button press.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallbackEvent {
    /// Query id to answer
    pub query_id: String,
    /// Chat of the message carrying the button
    pub chat_id: ChatId,
    /// Message carrying the button, if still accessible
    pub message_id: Option<MessageId>,
    /// Who pressed it
    pub sender: Sender,
    /// Decoded payload
    pub data: CallbackData,
}

/// An inline query typed in any chat.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InlineEvent {
    /// Query id to answer
    pub query_id: String,
    /// Who typed it
    pub sender: Sender,
    /// Query text
    pub query: String,
}

/// Inbound event, one variant per kind the conversation reacts to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// A known slash command
    Command {
        /// Chat the command was sent in
        chat_id: ChatId,
        /// Sender, absent for channel posts
        sender: Option<Sender>,
        /// Parsed command
        command: Command,
    },
    /// Plain text
    Text {
        /// Chat the text was sent in
        chat_id: ChatId,
        /// Sender, absent for channel posts
        sender: Option<Sender>,
        /// Message text
        text: String,
    },
    /// Inline keyboard button press
    Callback(CallbackEvent),
    /// Inline query
    InlineQuery(InlineEvent),
    /// Anything else (edits, media, unknown commands, ...)
    Ignored,
}

impl Event {
    /// Decode a Telegram update.
    #[must_use]
    pub fn from_update(update: &Update) -> Self {
        match &update.kind {
            UpdateKind::Message(message) => Self::from_message(message),
            UpdateKind::CallbackQuery(query) => Self::from_callback(query),
            UpdateKind::InlineQuery(query) => Self::from_inline(query),
            _ => Self::Ignored,
        }
    }

    fn from_message(message: &Message) -> Self {
        let Some(text) = message.text() else {
            return Self::Ignored;
        };
        let chat_id = message.chat.id;
        let sender = message.from.as_ref().map(Sender::from);

        if text.starts_with('/') {
            return Command::from_text(text).map_or(Self::Ignored, |command| Self::Command {
                chat_id,
                sender,
                command,
            });
        }

        Self::Text {
            chat_id,
            sender,
            text: text.to_string(),
        }
    }

    fn from_callback(query: &CallbackQuery) -> Self {
        let Some(data) = query.data.as_deref() else {
            return Self::Ignored;
        };
        let chat_id = query
            .message
            .as_ref()
            .map_or_else(|| ChatId::from(query.from.id), |m| m.chat().id);

        Self::Callback(CallbackEvent {
            query_id: query.id.to_string(),
            chat_id,
            message_id: query.message.as_ref().map(|m| m.id()),
            sender: Sender::from(&query.from),
            data: CallbackData::parse(data),
        })
    }

    fn from_inline(query: &InlineQuery) -> Self {
        Self::InlineQuery(InlineEvent {
            query_id: query.id.to_string(),
            sender: Sender::from(&query.from),
            query: query.query.clone(),
        })
    }

    /// Short name for logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Command { .. } => "command",
            Self::Text { .. } => "text",
            Self::Callback(_) => "callback",
            Self::InlineQuery(_) => "inline_query",
            Self::Ignored => "ignored",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bot::actions::Action;

    fn update(value: serde_json::Value) -> Update {
        // Decoded from text like the webhook body; `from_value` loses the update kind.
        serde_json::from_str(&value.to_string())
            .unwrap_or_else(|e| panic!("bad update fixture: {e}"))
    }

    fn user() -> serde_json::Value {
        serde_json::json!({
            "id": 42,
            "is_bot": false,
            "first_name": "Neo",
            "username": "the_one",
            "language_code": "ru"
        })
    }

    fn message(text: &str) -> serde_json::Value {
        serde_json::json!({
            "update_id": 1,
            "message": {
                "message_id": 10,
                "date": 1_700_000_000,
                "chat": {"id": 42, "type": "private", "first_name": "Neo"},
                "from": user(),
                "text": text
            }
        })
    }

    #[test]
    fn test_command_parsing() {
        assert_eq!(Command::from_text("/movies"), Some(Command::Movies));
        assert_eq!(Command::from_text("/start@CineBot"), Some(Command::Start));
        assert_eq!(Command::from_text("/stop now"), Some(Command::Stop));
        assert_eq!(Command::from_text("/help"), None);
    }

    #[test]
    fn test_text_and_command_events() {
        let event = Event::from_update(&update(message("matrix")));
        let Event::Text { chat_id, sender, text } = event else {
            panic!("expected text event");
        };
        assert_eq!(chat_id, ChatId(42));
        assert_eq!(text, "matrix");
        assert_eq!(sender.map(|s| s.language_code), Some(Some("ru".into())));

        assert!(matches!(
            Event::from_update(&update(message("/movies"))),
            Event::Command {
                command: Command::Movies,
                ..
            }
        ));
        assert_eq!(Event::from_update(&update(message("/unknown"))), Event::Ignored);
    }

    #[test]
    fn test_callback_event() {
        let event = Event::from_update(&update(serde_json::json!({
            "update_id": 2,
            "callback_query": {
                "id": "cbq-1",
                "from": user(),
                "chat_instance": "ci",
                "data": "select_genre",
                "message": {
                    "message_id": 11,
                    "date": 1_700_000_000,
                    "chat": {"id": 42, "type": "private", "first_name": "Neo"},
                    "text": "menu"
                }
            }
        })));
        let Event::Callback(callback) = event else {
            panic!("expected callback event");
        };
        assert_eq!(callback.query_id, "cbq-1");
        assert_eq!(callback.message_id, Some(MessageId(11)));
        assert_eq!(callback.data.action(), Some(Action::SelectGenre));
        assert_eq!(callback.sender.id, 42);
    }

    #[test]
    fn test_inline_event() {
        let event = Event::from_update(&update(serde_json::json!({
            "update_id": 3,
            "inline_query": {
                "id": "iq-1",
                "from": user(),
                "query": "alien",
                "offset": ""
            }
        })));
        assert_eq!(event.kind(), "inline_query");
    }

    #[test]
    fn test_sender_to_chat_user() {
        let sender = Sender {
            id: 5,
            username: None,
            first_name: String::new(),
            last_name: Some("Smith".into()),
            language_code: None,
        };
        let user = sender.to_chat_user();
        assert_eq!(user.user_id, 5);
        assert_eq!(user.first_name, None);
        assert_eq!(user.last_name.as_deref(), Some("Smith"));
    }
}

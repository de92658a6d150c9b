/// Callback payloads carried by inline buttons
pub mod actions;
/// Conversation engine: routes events through the state machine
pub mod engine;
/// Inbound events decoded from Telegram updates
pub mod event;
mod handlers;
/// Outbound Telegram delivery
pub mod messenger;
/// Per-chat session and conversation states
pub mod state;
/// Localized user-facing texts
pub mod texts;
/// View layer for UI components (keyboards, movie cards)
pub mod views;

pub use engine::{ConversationEngine, EngineError};
pub use messenger::{DeliveryError, Messenger, TelegramMessenger};

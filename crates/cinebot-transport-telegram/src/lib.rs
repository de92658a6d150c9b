#![deny(missing_docs)]
//! Telegram transport adapter for Cinebot.

/// Telegram-specific bot/transport implementation.
pub mod bot;
/// Telegram transport configuration.
pub mod config;
/// Token to conversation engine registry.
pub mod registry;
/// Telegram runtime entrypoint.
pub mod runner;
/// Webhook HTTP surface.
pub mod webhook;

#[cfg(test)]
pub(crate) mod testing;

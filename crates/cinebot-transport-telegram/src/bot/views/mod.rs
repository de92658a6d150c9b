//! View layer for bot UI components
//!
//! Contains keyboards, movie cards and filter summaries for Telegram UI.

pub mod menus;
pub mod movies;

pub use menus::*;
pub use movies::*;

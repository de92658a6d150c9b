#![deny(missing_docs)]
//! Cinebot core library.
//!
//! Movie catalog access, discovery filters, user storage and shared settings.

/// Configuration management.
pub mod config;
/// Discovery filters and query building.
pub mod discover;
/// Movie database client and catalog adapter.
pub mod movies;
/// Storage layer for chat users (R2/S3 or in-memory).
pub mod storage;
/// Utility functions.
pub mod utils;

#[cfg(test)]
pub mod testing;

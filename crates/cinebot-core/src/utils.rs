//! Utility functions for text processing and transport retries.

use crate::config::{
    TELEGRAM_API_INITIAL_BACKOFF_MS, TELEGRAM_API_MAX_BACKOFF_MS, TELEGRAM_API_MAX_RETRIES,
};
use std::time::Duration;
use tokio_retry::strategy::{jitter, ExponentialBackoff};
use tokio_retry::RetryIf;
use tracing::warn;

/// Safely truncates a string to a maximum character length (not bytes).
///
/// This is UTF-8 safe and will not panic on multi-byte characters.
///
/// # Examples
///
/// ```
/// use cinebot_core::utils::truncate_str;
/// let s = "Привет, мир!";
/// assert_eq!(truncate_str(s, 6), "Привет");
/// ```
pub fn truncate_str(s: impl AsRef<str>, max_chars: usize) -> String {
    let s = s.as_ref();
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    s.char_indices()
        .nth(max_chars)
        .map_or_else(|| s.to_string(), |(pos, _)| s[..pos].to_string())
}

/// Upper-case the first letter of every word and lower-case the rest.
///
/// A word starts after any non-alphabetic character.
///
/// ```
/// use cinebot_core::utils::title_case;
/// assert_eq!(title_case("science fiction"), "Science Fiction");
/// assert_eq!(title_case("TV movie"), "Tv Movie");
/// ```
#[must_use]
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut at_word_start = true;
    for c in s.chars() {
        if c.is_alphabetic() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = true;
        }
    }
    out
}

/// Escape text for Telegram HTML parse mode.
#[must_use]
pub fn escape_html(text: &str) -> String {
    html_escape::encode_text(text).into_owned()
}

/// Retry a Telegram API operation with exponential backoff.
///
/// Only errors for which `is_transient` returns `true` are retried; any other
/// error is returned immediately.
///
/// - Initial delay: 500ms
/// - Max delay: 4s
/// - Max attempts: 3 (see constants in `config.rs`)
///
/// # Errors
///
/// Returns the last error once attempts are exhausted, or the first
/// non-transient error.
pub async fn retry_transport_operation<F, Fut, T, E, P>(operation: F, is_transient: P) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, E>>,
    P: FnMut(&E) -> bool,
    E: std::fmt::Display,
{
    let retry_strategy = ExponentialBackoff::from_millis(TELEGRAM_API_INITIAL_BACKOFF_MS)
        .max_delay(Duration::from_millis(TELEGRAM_API_MAX_BACKOFF_MS))
        .map(jitter)
        .take(TELEGRAM_API_MAX_RETRIES);

    RetryIf::start(retry_strategy, operation, is_transient)
        .await
        .map_err(|e| {
            warn!("Telegram API operation failed: {e}");
            e
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_truncate_str_unicode() {
        assert_eq!(truncate_str("Привет, мир!", 6), "Привет");
        assert_eq!(truncate_str("short", 10), "short");
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("action"), "Action");
        assert_eq!(title_case("science fiction"), "Science Fiction");
        assert_eq!(title_case("драма"), "Драма");
        assert_eq!(title_case("sci-fi"), "Sci-Fi");
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("Tom & Jerry <3"), "Tom &amp; Jerry &lt;3");
    }

    #[tokio::test]
    async fn test_retry_stops_on_permanent_error() {
        let calls = AtomicUsize::new(0);
        let result: Result<(), String> = retry_transport_operation(
            || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err("forbidden".to_string()) }
            },
            |_| false,
        )
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_retry_recovers_from_transient_error() {
        let calls = AtomicUsize::new(0);
        let result: Result<u32, String> = retry_transport_operation(
            || {
                let attempt = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if attempt == 0 {
                        Err("timeout".to_string())
                    } else {
                        Ok(7)
                    }
                }
            },
            |_| true,
        )
        .await;
        assert_eq!(result, Ok(7));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}

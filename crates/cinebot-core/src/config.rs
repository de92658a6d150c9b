//! Configuration and settings management
//!
//! Loads settings from config files and environment variables and defines
//! the catalog constants shared by every transport.

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

/// Minimum average rating (exclusive) a movie needs to be shown.
pub const MIN_VOTE_AVERAGE: f64 = 5.0;
/// Minimum vote count (exclusive) a movie needs to be shown.
pub const MIN_VOTE_COUNT: u64 = 50;

/// `vote_average.gte` sent with every discover query.
pub const DISCOVER_MIN_VOTE_AVERAGE: u32 = 6;
/// `vote_count.gte` sent with every discover query.
pub const DISCOVER_MIN_VOTE_COUNT: u32 = 200;
/// Sort order sent with every discover query.
pub const DISCOVER_SORT_BY: &str = "popularity.desc";

/// Maximum synopsis length (characters) rendered in a movie card.
pub const SYNOPSIS_MAX_CHARS: usize = 500;
/// Number of search pages merged into one inline query answer.
pub const INLINE_SEARCH_PAGES: u32 = 5;
/// Telegram accepts at most 50 results per inline query answer.
pub const INLINE_RESULTS_LIMIT: usize = 50;

/// Initial backoff for retried Telegram API calls.
pub const TELEGRAM_API_INITIAL_BACKOFF_MS: u64 = 500;
/// Maximum backoff for retried Telegram API calls.
pub const TELEGRAM_API_MAX_BACKOFF_MS: u64 = 4000;
/// Maximum retry attempts for Telegram API calls.
pub const TELEGRAM_API_MAX_RETRIES: usize = 3;

/// Default lifetime of a cached genre list (24 hours).
pub const GENRE_CACHE_TTL_SECS: u64 = 86_400;

/// Settings shared by the catalog, storage and every transport.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CoreSettings {
    /// TMDB API key (v3 auth)
    pub tmdb_api_key: String,
    /// TMDB API base URL
    #[serde(default = "default_tmdb_api_url")]
    pub tmdb_api_url: String,
    /// Base URL prepended to backdrop paths
    #[serde(default = "default_tmdb_image_base_url")]
    pub tmdb_image_base_url: String,
    /// Base URL of public movie pages
    #[serde(default = "default_tmdb_movie_base_url")]
    pub tmdb_movie_base_url: String,

    /// Language used when the user has none (or an unsupported one)
    #[serde(default = "default_language")]
    pub default_language: String,
    /// Comma-separated list of supported language codes
    #[serde(default = "default_supported_languages")]
    pub supported_languages: String,

    /// Lifetime of the per-language genre cache
    #[serde(default = "default_genre_cache_ttl_secs")]
    pub genre_cache_ttl_secs: u64,

    /// R2 Storage access key ID
    pub r2_access_key_id: Option<String>,
    /// R2 Storage secret access key
    pub r2_secret_access_key: Option<String>,
    /// R2 Storage endpoint URL
    pub r2_endpoint_url: Option<String>,
    /// R2 Storage bucket name
    pub r2_bucket_name: Option<String>,
}

fn default_tmdb_api_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

fn default_tmdb_image_base_url() -> String {
    "https://www.themoviedb.org/t/p/w600_and_h900_bestv2".to_string()
}

fn default_tmdb_movie_base_url() -> String {
    "https://www.themoviedb.org/movie".to_string()
}

fn default_language() -> String {
    "en".to_string()
}

fn default_supported_languages() -> String {
    "en,ru,uk".to_string()
}

const fn default_genre_cache_ttl_secs() -> u64 {
    GENRE_CACHE_TTL_SECS
}

/// Build the layered configuration source used by every settings struct.
///
/// Order: `config/default`, `config/{RUN_MODE}`, `config/local`, `APP__*`
/// environment, plain environment (empty values treated as unset).
///
/// # Errors
///
/// Returns a `ConfigError` if a present file cannot be parsed.
pub fn build_config() -> Result<Config, ConfigError> {
    let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

    Config::builder()
        .add_source(File::with_name("config/default").required(false))
        .add_source(File::with_name(&format!("config/{run_mode}")).required(false))
        // Not checked into git
        .add_source(File::with_name("config/local").required(false))
        .add_source(Environment::with_prefix("APP").separator("__"))
        .add_source(Environment::default().ignore_empty(true))
        .build()
}

impl CoreSettings {
    /// Create new settings by loading from environment and files
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if loading fails or `TMDB_API_KEY` is missing.
    pub fn new() -> Result<Self, ConfigError> {
        build_config()?.try_deserialize()
    }

    /// Returns supported language codes in configuration order.
    #[must_use]
    pub fn supported_languages(&self) -> Vec<String> {
        self.supported_languages
            .split(|c: char| c == ',' || c == ';' || c.is_whitespace())
            .filter(|token| !token.is_empty())
            .map(str::to_lowercase)
            .collect()
    }

    /// Resolve a user language code to a supported one.
    ///
    /// Accepts regional tags (`ru-RU` resolves to `ru`).
    #[must_use]
    pub fn resolve_language(&self, code: Option<&str>) -> String {
        let supported = self.supported_languages();
        code.map(|c| {
            c.split(['-', '_'])
                .next()
                .unwrap_or_default()
                .to_lowercase()
        })
        .filter(|c| supported.iter().any(|s| s == c))
        .unwrap_or_else(|| self.default_language.clone())
    }

    /// Whether R2 credentials are fully configured.
    #[must_use]
    pub fn has_r2(&self) -> bool {
        self.r2_endpoint_url.is_some()
            && self.r2_access_key_id.is_some()
            && self.r2_secret_access_key.is_some()
            && self.r2_bucket_name.is_some()
    }
}

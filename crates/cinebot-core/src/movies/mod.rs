//! Movie database access
//!
//! [`MovieDatabase`] is the raw API surface (implemented by [`TmdbClient`]);
//! [`MovieCatalog`] layers the quality filter, ordering and genre caching on
//! top of it.

pub mod catalog;
pub mod tmdb;

pub use catalog::{quality_filter, GenreMap, MovieCatalog};
pub use tmdb::TmdbClient;

use crate::discover::DiscoverQuery;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors returned by the movie database.
#[derive(Error, Debug)]
pub enum MovieError {
    /// Transport failure (connect, timeout, body read)
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    /// Non-success HTTP status from the API
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// `status_message` from the API body, or the raw body
        message: String,
    },
    /// Response body did not match the expected schema
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Movie summary as returned by list, search and discover endpoints.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    /// TMDB id
    pub id: u64,
    /// Localized title
    #[serde(default)]
    pub title: String,
    /// Localized synopsis
    #[serde(default)]
    pub overview: String,
    /// Average rating, 0..10
    #[serde(default)]
    pub vote_average: f64,
    /// Number of votes
    #[serde(default)]
    pub vote_count: u64,
    /// `YYYY-MM-DD`, may be empty for unreleased titles
    #[serde(default)]
    pub release_date: Option<String>,
    /// Genre ids
    #[serde(default)]
    pub genre_ids: Vec<u32>,
    /// Backdrop image path
    #[serde(default)]
    pub backdrop_path: Option<String>,
    /// Poster image path
    #[serde(default)]
    pub poster_path: Option<String>,
}

/// One page of results.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MoviePage {
    /// Page number (1-based)
    #[serde(default = "first_page")]
    pub page: u32,
    /// Total pages known to the API
    #[serde(default)]
    pub total_pages: u32,
    /// Movies on this page
    #[serde(default)]
    pub results: Vec<Movie>,
}

const fn first_page() -> u32 {
    1
}

impl MoviePage {
    /// Whether the API reports pages after this one.
    #[must_use]
    pub fn has_more(&self) -> bool {
        self.page < self.total_pages
    }
}

/// Genre id and name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    /// TMDB genre id
    pub id: u32,
    /// Localized name
    pub name: String,
}

/// Curated, fixed-query movie lists.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CuratedList {
    /// Currently popular
    Popular,
    /// Highest rated
    TopRated,
    /// Coming soon
    Upcoming,
    /// In theatres now
    NowPlaying,
}

impl CuratedList {
    /// All lists in menu order.
    pub const ALL: [Self; 4] = [Self::Popular, Self::TopRated, Self::Upcoming, Self::NowPlaying];

    /// Stable identifier, also used as callback data.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Popular => "popular",
            Self::TopRated => "top_rated",
            Self::Upcoming => "upcoming",
            Self::NowPlaying => "now_playing",
        }
    }

    /// API path below the base URL.
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Popular => "movie/popular",
            Self::TopRated => "movie/top_rated",
            Self::Upcoming => "movie/upcoming",
            Self::NowPlaying => "movie/now_playing",
        }
    }
}

impl fmt::Display for CuratedList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CuratedList {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|list| list.as_str() == s)
            .ok_or(())
    }
}

/// Raw movie database calls.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MovieDatabase: Send + Sync {
    /// Fetch one page of a curated list
    async fn list(
        &self,
        list: CuratedList,
        page: u32,
        language: &str,
    ) -> Result<MoviePage, MovieError>;
    /// Free-text title search
    async fn search(&self, query: &str, page: u32, language: &str)
        -> Result<MoviePage, MovieError>;
    /// Structured discover query
    async fn discover(&self, query: &DiscoverQuery) -> Result<MoviePage, MovieError>;
    /// Movie genre taxonomy
    async fn genres(&self, language: &str) -> Result<Vec<Genre>, MovieError>;
}

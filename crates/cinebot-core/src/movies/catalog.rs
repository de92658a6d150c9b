//! Catalog adapter over the raw movie database.
//!
//! Every result page passes through [`quality_filter`]; genre lists are
//! memoized per language.

use super::{CuratedList, Genre, Movie, MovieDatabase, MovieError, MoviePage};
use crate::config::{MIN_VOTE_AVERAGE, MIN_VOTE_COUNT};
use crate::discover::DiscoverQuery;
use crate::utils::title_case;
use moka::future::Cache;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Genre id to display name, in API order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GenreMap {
    entries: Vec<(u32, String)>,
}

impl GenreMap {
    /// Build from API genres, title-casing names.
    #[must_use]
    pub fn from_genres(genres: Vec<Genre>) -> Self {
        Self {
            entries: genres
                .into_iter()
                .map(|g| (g.id, title_case(&g.name)))
                .collect(),
        }
    }

    /// Display name for `id`.
    #[must_use]
    pub fn name(&self, id: u32) -> Option<&str> {
        self.entries
            .iter()
            .find(|(genre_id, _)| *genre_id == id)
            .map(|(_, name)| name.as_str())
    }

    /// Iterate `(id, name)` pairs in API order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &str)> {
        self.entries.iter().map(|(id, name)| (*id, name.as_str()))
    }

    /// Number of genres.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn is_presentable(movie: &Movie) -> bool {
    movie.vote_average > MIN_VOTE_AVERAGE
        && movie.vote_count > MIN_VOTE_COUNT
        && movie.backdrop_path.as_deref().is_some_and(|p| !p.is_empty())
        && !movie.overview.trim().is_empty()
}

/// Drop low-quality or incomplete movies, de-duplicate by id and sort
/// ascending by rating.
#[must_use]
pub fn quality_filter(movies: Vec<Movie>) -> Vec<Movie> {
    let mut seen = HashSet::new();
    let mut kept: Vec<Movie> = movies
        .into_iter()
        .filter(is_presentable)
        .filter(|m| seen.insert(m.id))
        .collect();
    kept.sort_by(|a, b| a.vote_average.total_cmp(&b.vote_average));
    kept
}

fn filter_page(mut page: MoviePage) -> MoviePage {
    let total = page.results.len();
    page.results = quality_filter(std::mem::take(&mut page.results));
    debug!(
        "Movies count: {} of {} (page {}/{})",
        page.results.len(),
        total,
        page.page,
        page.total_pages
    );
    page
}

/// Filtered, cached access to the movie database.
pub struct MovieCatalog {
    db: Arc<dyn MovieDatabase>,
    genres: Cache<String, Arc<GenreMap>>,
}

impl MovieCatalog {
    /// Wrap `db`, caching genre lists for `genre_ttl`.
    #[must_use]
    pub fn new(db: Arc<dyn MovieDatabase>, genre_ttl: Duration) -> Self {
        let genres = Cache::builder()
            .max_capacity(64)
            .time_to_live(genre_ttl)
            .build();
        Self { db, genres }
    }

    /// One filtered page of a curated list.
    ///
    /// # Errors
    ///
    /// Propagates database errors.
    pub async fn list(
        &self,
        list: CuratedList,
        page: u32,
        language: &str,
    ) -> Result<MoviePage, MovieError> {
        Ok(filter_page(self.db.list(list, page, language).await?))
    }

    /// One filtered page of search results.
    ///
    /// # Errors
    ///
    /// Propagates database errors.
    pub async fn search(
        &self,
        query: &str,
        page: u32,
        language: &str,
    ) -> Result<MoviePage, MovieError> {
        Ok(filter_page(self.db.search(query, page, language).await?))
    }

    /// One filtered page of discover results.
    ///
    /// # Errors
    ///
    /// Propagates database errors.
    pub async fn discover(&self, query: &DiscoverQuery) -> Result<MoviePage, MovieError> {
        Ok(filter_page(self.db.discover(query).await?))
    }

    /// Genre names for `language`, fetched once per cache lifetime.
    ///
    /// # Errors
    ///
    /// Propagates database errors on a cache miss.
    pub async fn genres(&self, language: &str) -> Result<Arc<GenreMap>, MovieError> {
        if let Some(cached) = self.genres.get(language).await {
            return Ok(cached);
        }

        let map = Arc::new(GenreMap::from_genres(self.db.genres(language).await?));
        info!("Cached {} movie genres for language '{language}'", map.len());
        self.genres.insert(language.to_string(), map.clone()).await;
        Ok(map)
    }

    /// Drop every cached genre list.
    pub fn invalidate_genres(&self) {
        self.genres.invalidate_all();
    }
}

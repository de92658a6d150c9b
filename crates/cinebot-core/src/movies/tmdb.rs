//! TMDB v3 HTTP client.
//!
//! Issues the raw calls only; filtering and caching live in the catalog.

use super::{CuratedList, Genre, MovieDatabase, MovieError, MoviePage};
use crate::config::CoreSettings;
use crate::discover::DiscoverQuery;
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

const REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Deserialize)]
struct GenreList {
    #[serde(default)]
    genres: Vec<Genre>,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    status_message: Option<String>,
}

/// Client for `api.themoviedb.org/3`.
#[derive(Clone)]
pub struct TmdbClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl TmdbClient {
    /// Create a client against `base_url` (no trailing slash needed).
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Result<Self, MovieError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    /// Create a client from settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_settings(settings: &CoreSettings) -> Result<Self, MovieError> {
        Self::new(settings.tmdb_api_url.clone(), settings.tmdb_api_key.clone())
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(String, String)],
    ) -> Result<T, MovieError> {
        let url = format!("{}/{}", self.base_url, path);
        debug!("TMDB request: {path} {params:?}");

        let response = self
            .http
            .get(&url)
            .query(&[("api_key", self.api_key.as_str())])
            .query(params)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .ok()
                .and_then(|b| b.status_message)
                .unwrap_or(body);
            return Err(MovieError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

fn paged(language: &str, page: u32) -> Vec<(String, String)> {
    vec![
        ("language".to_string(), language.to_string()),
        ("page".to_string(), page.max(1).to_string()),
    ]
}

#[async_trait]
impl MovieDatabase for TmdbClient {
    async fn list(
        &self,
        list: CuratedList,
        page: u32,
        language: &str,
    ) -> Result<MoviePage, MovieError> {
        self.get(list.path(), &paged(language, page)).await
    }

    async fn search(
        &self,
        query: &str,
        page: u32,
        language: &str,
    ) -> Result<MoviePage, MovieError> {
        let mut params = paged(language, page);
        params.push(("query".to_string(), query.to_string()));
        self.get("search/movie", &params).await
    }

    async fn discover(&self, query: &DiscoverQuery) -> Result<MoviePage, MovieError> {
        self.get("discover/movie", &query.to_params()).await
    }

    async fn genres(&self, language: &str) -> Result<Vec<Genre>, MovieError> {
        let list: GenreList = self
            .get(
                "genre/movie/list",
                &[("language".to_string(), language.to_string())],
            )
            .await?;
        Ok(list.genres)
    }
}

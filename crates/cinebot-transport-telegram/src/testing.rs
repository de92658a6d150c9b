//! Test doubles for the conversation engine.

use crate::bot::messenger::{DeliveryError, Messenger, Reply};
use crate::bot::ConversationEngine;
use crate::config::BotRegistration;
use crate::registry::EngineFactory;
use async_trait::async_trait;
use cinebot_core::config::CoreSettings;
use cinebot_core::discover::DiscoverQuery;
use cinebot_core::movies::{
    CuratedList, Genre, Movie, MovieCatalog, MovieDatabase, MovieError, MoviePage,
};
use cinebot_core::storage::InMemoryStorage;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use teloxide::types::{ChatId, InlineKeyboardMarkup, InlineQueryResult, MessageId};
use tokio::sync::Mutex;

/// One recorded outbound call.
#[derive(Clone, Debug, PartialEq)]
pub enum Outbound {
    Send(ChatId, Reply),
    Edit(ChatId, MessageId, Reply),
    Keyboard(ChatId, MessageId, Option<InlineKeyboardMarkup>),
    Delete(ChatId, MessageId),
    Photo(ChatId, String),
    AnswerCallback(String),
    AnswerInline(String, usize),
}

/// Messenger that records every call; optionally behaves as if blocked.
#[derive(Default)]
pub struct RecordingMessenger {
    calls: Mutex<Vec<Outbound>>,
    blocked: AtomicBool,
}

impl RecordingMessenger {
    pub fn blocking() -> Self {
        let messenger = Self::default();
        messenger.blocked.store(true, Ordering::SeqCst);
        messenger
    }

    pub async fn calls(&self) -> Vec<Outbound> {
        self.calls.lock().await.clone()
    }

    /// Drain recorded calls.
    pub async fn take(&self) -> Vec<Outbound> {
        std::mem::take(&mut *self.calls.lock().await)
    }

    async fn record(&self, call: Outbound) -> Result<(), DeliveryError> {
        self.calls.lock().await.push(call);
        if self.blocked.load(Ordering::SeqCst) {
            Err(DeliveryError::Blocked)
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl Messenger for RecordingMessenger {
    async fn send_message(&self, chat_id: ChatId, reply: Reply) -> Result<(), DeliveryError> {
        self.record(Outbound::Send(chat_id, reply)).await
    }

    async fn edit_message(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
        reply: Reply,
    ) -> Result<(), DeliveryError> {
        self.record(Outbound::Edit(chat_id, message_id, reply)).await
    }

    async fn edit_keyboard(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
        keyboard: Option<InlineKeyboardMarkup>,
    ) -> Result<(), DeliveryError> {
        self.record(Outbound::Keyboard(chat_id, message_id, keyboard))
            .await
    }

    async fn delete_message(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
    ) -> Result<(), DeliveryError> {
        self.record(Outbound::Delete(chat_id, message_id)).await
    }

    async fn send_photo(&self, chat_id: ChatId, url: &str) -> Result<(), DeliveryError> {
        self.record(Outbound::Photo(chat_id, url.to_string())).await
    }

    async fn answer_callback(&self, query_id: &str) -> Result<(), DeliveryError> {
        // Callback answers never fail with "blocked".
        self.calls
            .lock()
            .await
            .push(Outbound::AnswerCallback(query_id.to_string()));
        Ok(())
    }

    async fn answer_inline(
        &self,
        query_id: &str,
        results: Vec<InlineQueryResult>,
    ) -> Result<(), DeliveryError> {
        self.record(Outbound::AnswerInline(query_id.to_string(), results.len()))
            .await
    }
}

/// A database request seen by [`StubMovies`].
#[derive(Clone, Debug, PartialEq)]
pub enum MovieRequest {
    List(CuratedList, u32),
    Search(String, u32),
    Discover(DiscoverQuery),
}

/// Movie database serving `per_page` movies on pages `1..=total_pages`.
pub struct StubMovies {
    total_pages: u32,
    per_page: u64,
    requests: Mutex<Vec<MovieRequest>>,
}

impl StubMovies {
    pub fn new(total_pages: u32, per_page: u64) -> Self {
        Self {
            total_pages,
            per_page,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub async fn requests(&self) -> Vec<MovieRequest> {
        self.requests.lock().await.clone()
    }

    async fn page(&self, request: MovieRequest, page: u32) -> MoviePage {
        self.requests.lock().await.push(request);
        let results = if page <= self.total_pages {
            (1..=self.per_page)
                .map(|n| movie(u64::from(page) * 100 + n))
                .collect()
        } else {
            Vec::new()
        };
        MoviePage {
            page,
            total_pages: self.total_pages,
            results,
        }
    }
}

#[async_trait]
impl MovieDatabase for StubMovies {
    async fn list(
        &self,
        list: CuratedList,
        page: u32,
        _language: &str,
    ) -> Result<MoviePage, MovieError> {
        Ok(self.page(MovieRequest::List(list, page), page).await)
    }

    async fn search(
        &self,
        query: &str,
        page: u32,
        _language: &str,
    ) -> Result<MoviePage, MovieError> {
        Ok(self
            .page(MovieRequest::Search(query.to_string(), page), page)
            .await)
    }

    async fn discover(&self, query: &DiscoverQuery) -> Result<MoviePage, MovieError> {
        Ok(self
            .page(MovieRequest::Discover(query.clone()), query.page)
            .await)
    }

    async fn genres(&self, _language: &str) -> Result<Vec<Genre>, MovieError> {
        Ok(vec![
            Genre {
                id: 28,
                name: "action".into(),
            },
            Genre {
                id: 35,
                name: "comedy".into(),
            },
        ])
    }
}

pub fn movie(id: u64) -> Movie {
    Movie {
        id,
        title: format!("Movie {id}"),
        overview: format!("Synopsis of movie {id}"),
        vote_average: 7.5,
        vote_count: 1000,
        release_date: Some("2003-05-15".into()),
        genre_ids: vec![28],
        backdrop_path: Some(format!("/backdrop{id}.jpg")),
        poster_path: None,
    }
}

pub fn settings() -> CoreSettings {
    serde_json::from_value(serde_json::json!({ "tmdb_api_key": "key" }))
        .unwrap_or_else(|e| panic!("settings fixture: {e}"))
}

fn build_engine(
    registration: BotRegistration,
    messenger: Arc<RecordingMessenger>,
    movies: Arc<StubMovies>,
    users: Arc<InMemoryStorage>,
) -> Arc<ConversationEngine> {
    Arc::new(ConversationEngine::new(
        registration,
        messenger,
        Arc::new(MovieCatalog::new(movies, Duration::from_secs(60))),
        users,
        Arc::new(settings()),
    ))
}

/// Wired test double bundle.
pub struct Harness {
    pub engine: Arc<ConversationEngine>,
    pub messenger: Arc<RecordingMessenger>,
    pub movies: Arc<StubMovies>,
    pub users: Arc<InMemoryStorage>,
}

impl Harness {
    pub fn new(messenger: RecordingMessenger, movies: StubMovies) -> Self {
        Self::with_registration(
            BotRegistration::from_token("123:secret"),
            messenger,
            movies,
        )
    }

    pub fn with_registration(
        registration: BotRegistration,
        messenger: RecordingMessenger,
        movies: StubMovies,
    ) -> Self {
        let messenger = Arc::new(messenger);
        let movies = Arc::new(movies);
        let users = Arc::new(InMemoryStorage::new());
        let engine = build_engine(registration, messenger.clone(), movies.clone(), users.clone());
        Self {
            engine,
            messenger,
            movies,
            users,
        }
    }
}

/// Factory whose engines all share one recording messenger.
pub struct RecordingFactory {
    pub messenger: Arc<RecordingMessenger>,
    movies: Arc<StubMovies>,
    users: Arc<InMemoryStorage>,
}

impl RecordingFactory {
    pub fn new() -> Self {
        Self {
            messenger: Arc::new(RecordingMessenger::default()),
            movies: Arc::new(StubMovies::new(1, 2)),
            users: Arc::new(InMemoryStorage::new()),
        }
    }
}

impl EngineFactory for RecordingFactory {
    fn build(&self, registration: BotRegistration) -> Arc<ConversationEngine> {
        build_engine(
            registration,
            self.messenger.clone(),
            self.movies.clone(),
            self.users.clone(),
        )
    }
}

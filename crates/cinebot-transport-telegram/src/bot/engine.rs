//! Conversation engine
//!
//! One engine per bot token. Every inbound [`Event`] is matched against the
//! chat's current [`State`] by [`route`]; the selected handler renders its
//! reply and leaves the next state in the session.

use crate::bot::actions::{Action, CallbackData};
use crate::bot::event::{Command, Event, Sender};
use crate::bot::handlers::{self, Trigger, Turn};
use crate::bot::messenger::{DeliveryError, Messenger};
use crate::bot::state::{DiscoverState, Session, State};
use crate::config::BotRegistration;
use cinebot_core::config::CoreSettings;
use cinebot_core::discover::FilterKind;
use cinebot_core::movies::{CuratedList, MovieCatalog, MovieError};
use cinebot_core::storage::{StorageError, UserStore};
use std::sync::Arc;
use teloxide::dispatching::dialogue::{Dialogue, InMemStorage, InMemStorageError};
use teloxide::types::{ChatId, Update};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors surfaced by the conversation engine.
#[derive(Error, Debug)]
pub enum EngineError {
    /// The event carries no user identity
    #[error("Can't extract user data from update")]
    MissingSender,
    /// Movie database failure
    #[error("Movie database error: {0}")]
    Movies(#[from] MovieError),
    /// Session storage failure
    #[error("Session error: {0}")]
    Session(#[from] InMemStorageError),
    /// User storage failure
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Handler selected for an event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Route {
    /// Fresh start by command
    Start,
    /// Back to the root menu from results
    ReturnToStart,
    /// Back to the root menu from discovery, wiping filters
    BackToStart,
    /// `/stop` outside discovery
    Stop,
    /// `/stop` inside discovery
    StopNested,
    /// Done button on the root menu
    End,
    /// Ask for search keywords
    SearchPrompt,
    /// First page of a new search
    Search {
        /// Entered keywords
        keyword: String,
    },
    /// Next page of the current search
    SearchNext,
    /// A curated list
    List(CuratedList),
    /// Next page of the current curated list
    ListNext,
    /// Show the discover menu, committing a pending filter value
    EnterDiscover,
    /// Show the keyboard of a filter kind
    SelectFilter(FilterKind),
    /// Show accumulated filters
    ShowParams,
    /// Drop accumulated filters and show the discover menu
    ClearParams,
    /// Run the discover query
    Discover {
        /// Continue with the next page
        next: bool,
    },
}

/// Input part of an event relevant for routing.
#[derive(Clone, Copy, Debug)]
pub enum Input<'a> {
    /// Slash command
    Command(Command),
    /// Plain text
    Text(&'a str),
    /// Button press
    Callback(&'a CallbackData),
}

/// Transition table. `None` means the event is ignored in this state.
#[must_use]
pub fn route(state: Option<State>, input: Input<'_>) -> Option<Route> {
    use DiscoverState::{Menu, SelectingSearchParam, ShowingSearchParams};
    use State::{Discovering, DisplayingMovies, ListingMovies, SearchingMovies, SelectingAction};

    let data = match input {
        Input::Command(Command::Movies | Command::Start) => return Some(Route::Start),
        Input::Command(Command::Stop) => {
            return match state? {
                Discovering(_) => Some(Route::StopNested),
                State::Stopping => None,
                _ => Some(Route::Stop),
            };
        }
        Input::Text(text) => {
            let keyword = text.trim();
            return (state == Some(SearchingMovies) && !keyword.is_empty()).then(|| Route::Search {
                keyword: keyword.to_string(),
            });
        }
        Input::Callback(data) => data,
    };

    let state = state?;
    if state == Discovering(SelectingSearchParam) {
        return Some(Route::EnterDiscover);
    }

    let route = match (state, data.action()?) {
        (SelectingAction, Action::DiscoverMovies) => Route::EnterDiscover,
        (SelectingAction, Action::SearchMovies) => Route::SearchPrompt,
        (SelectingAction, Action::List(list)) => Route::List(list),
        (SelectingAction, Action::End) => Route::End,
        (DisplayingMovies, Action::NextMovies) => Route::SearchNext,
        (ListingMovies, Action::NextMovies) => Route::ListNext,
        (DisplayingMovies | ListingMovies, Action::End) => Route::ReturnToStart,
        (Discovering(Menu), Action::SelectGenre) => Route::SelectFilter(FilterKind::Genres),
        (Discovering(Menu), Action::SelectYears) => Route::SelectFilter(FilterKind::Years),
        (Discovering(Menu | ShowingSearchParams), Action::Discover) => {
            Route::Discover { next: false }
        }
        (Discovering(Menu | ShowingSearchParams), Action::NextMovies) => {
            Route::Discover { next: true }
        }
        (Discovering(Menu), Action::End) => Route::BackToStart,
        (Discovering(ShowingSearchParams), Action::ClearSearchParams) => Route::ClearParams,
        (Discovering(ShowingSearchParams), Action::BackFromShowSearchParams | Action::End) => {
            Route::EnterDiscover
        }
        (Discovering(_), Action::ShowSearchParams) => Route::ShowParams,
        _ => return None,
    };
    Some(route)
}

/// Per-bot conversation engine.
pub struct ConversationEngine {
    pub(crate) registration: BotRegistration,
    pub(crate) messenger: Arc<dyn Messenger>,
    pub(crate) catalog: Arc<MovieCatalog>,
    pub(crate) users: Arc<dyn UserStore>,
    pub(crate) settings: Arc<CoreSettings>,
    sessions: Arc<InMemStorage<Session>>,
}

impl ConversationEngine {
    /// Create an engine with empty session storage.
    #[must_use]
    pub fn new(
        registration: BotRegistration,
        messenger: Arc<dyn Messenger>,
        catalog: Arc<MovieCatalog>,
        users: Arc<dyn UserStore>,
        settings: Arc<CoreSettings>,
    ) -> Self {
        Self {
            registration,
            messenger,
            catalog,
            users,
            settings,
            sessions: InMemStorage::new(),
        }
    }

    /// Bot token this engine serves.
    #[must_use]
    pub fn token(&self) -> &str {
        &self.registration.token
    }

    /// Display title of the bot.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.registration.title
    }

    /// Current session of a chat, if a conversation is active.
    ///
    /// # Errors
    ///
    /// Returns an error if the session storage fails.
    pub async fn session(&self, chat_id: ChatId) -> Result<Option<Session>, EngineError> {
        Ok(Dialogue::new(self.sessions.clone(), chat_id).get().await?)
    }

    /// Decode and handle a raw Telegram update.
    ///
    /// # Errors
    ///
    /// See [`ConversationEngine::handle`].
    pub async fn handle_update(&self, update: &Update) -> Result<(), EngineError> {
        self.handle(Event::from_update(update)).await
    }

    /// Handle one event.
    ///
    /// # Errors
    ///
    /// Returns an error if the sender is missing where an identity is
    /// required, or if the movie database or storage fails. Delivery failures
    /// are logged, not returned.
    pub async fn handle(&self, event: Event) -> Result<(), EngineError> {
        debug!(bot = %self.title(), kind = event.kind(), "Handling event");
        match event {
            Event::Command {
                chat_id,
                sender,
                command,
            } => {
                self.converse(chat_id, sender.as_ref(), Trigger::UserMessage, Input::Command(command))
                    .await
            }
            Event::Text {
                chat_id,
                sender,
                text,
            } => {
                self.converse(chat_id, sender.as_ref(), Trigger::UserMessage, Input::Text(&text))
                    .await
            }
            Event::Callback(callback) => {
                let trigger = Trigger::Callback {
                    query_id: callback.query_id.clone(),
                    message_id: callback.message_id,
                    data: callback.data.clone(),
                };
                self.converse(
                    callback.chat_id,
                    Some(&callback.sender),
                    trigger,
                    Input::Callback(&callback.data),
                )
                .await
            }
            Event::InlineQuery(query) => handlers::inline::search(self, &query).await,
            Event::Ignored => Ok(()),
        }
    }

    async fn converse(
        &self,
        chat_id: ChatId,
        sender: Option<&Sender>,
        trigger: Trigger,
        input: Input<'_>,
    ) -> Result<(), EngineError> {
        let dialogue = Dialogue::new(self.sessions.clone(), chat_id);
        let session = dialogue.get().await?.unwrap_or_default();

        let Some(route) = route(session.state, input) else {
            debug!(
                "No transition for chat {} in state {:?} on {input:?}",
                chat_id.0, session.state
            );
            if let Trigger::Callback { query_id, .. } = &trigger {
                if let Err(e) = self.messenger.answer_callback(query_id).await {
                    debug!("Failed to answer callback query {query_id}: {e}");
                }
            }
            return Ok(());
        };
        info!(
            "Bot '{}', chat {}: {:?} -> {route:?}",
            self.title(),
            chat_id.0,
            session.state
        );

        let mut turn = Turn {
            engine: self,
            chat_id,
            sender,
            trigger,
            session,
        };
        handlers::dispatch(&mut turn, route).await?;

        if turn.session.state.is_some() {
            dialogue.update(turn.session).await?;
        } else if let Err(e) = dialogue.exit().await {
            debug!("No session to clear for chat {}: {e}", chat_id.0);
        }
        Ok(())
    }

    /// Log a delivery outcome, flag users that blocked the bot and report
    /// whether it succeeded.
    pub(crate) async fn deliver(&self, user_id: i64, result: Result<(), DeliveryError>) -> bool {
        match result {
            Ok(()) => true,
            Err(DeliveryError::Blocked) => {
                warn!("Can't send message to {user_id}. Reason: Bot was stopped.");
                if let Err(e) = self.users.set_blocked(user_id, true).await {
                    warn!("Failed to flag user {user_id} as blocked: {e}");
                }
                false
            }
            Err(e) => {
                warn!("Can't send message to {user_id}. Reason: {e}");
                false
            }
        }
    }
}

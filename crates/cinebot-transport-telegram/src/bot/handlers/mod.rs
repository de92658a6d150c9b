//! Route handlers and the per-event context they share.

mod browse;
mod discover;
mod entry;
pub(crate) mod inline;

use crate::bot::actions::CallbackData;
use crate::bot::engine::{ConversationEngine, EngineError, Route};
use crate::bot::event::Sender;
use crate::bot::messenger::Reply;
use crate::bot::state::Session;
use crate::bot::texts::{Locale, Texts};
use crate::bot::views::{image_url, render_movie_card, results_keyboard};
use cinebot_core::movies::MoviePage;
use teloxide::types::{ChatId, MessageId};
use tracing::debug;

/// What caused the current turn.
#[derive(Clone, Debug)]
pub(crate) enum Trigger {
    /// A message typed by the user
    UserMessage,
    /// A button press on a bot message
    Callback {
        query_id: String,
        message_id: Option<MessageId>,
        data: CallbackData,
    },
}

/// Context of one conversation step.
pub(crate) struct Turn<'a> {
    pub(crate) engine: &'a ConversationEngine,
    pub(crate) chat_id: ChatId,
    pub(crate) sender: Option<&'a Sender>,
    pub(crate) trigger: Trigger,
    pub(crate) session: Session,
}

pub(crate) async fn dispatch(turn: &mut Turn<'_>, route: Route) -> Result<(), EngineError> {
    turn.answer_callback().await;

    match route {
        Route::Start => entry::start(turn).await,
        Route::ReturnToStart => entry::return_to_start(turn).await,
        Route::BackToStart => entry::back_to_start(turn).await,
        Route::Stop => entry::stop(turn, false).await,
        Route::StopNested => entry::stop(turn, true).await,
        Route::End => entry::end(turn).await,
        Route::SearchPrompt => browse::search_prompt(turn).await,
        Route::Search { keyword } => browse::search(turn, keyword).await,
        Route::SearchNext => browse::search_next(turn).await,
        Route::List(list) => browse::list(turn, Some(list)).await,
        Route::ListNext => browse::list(turn, None).await,
        Route::EnterDiscover => discover::enter(turn).await,
        Route::SelectFilter(kind) => discover::select_filter(turn, kind).await,
        Route::ShowParams => discover::show_params(turn).await,
        Route::ClearParams => {
            turn.session.wipe();
            discover::enter(turn).await
        }
        Route::Discover { next } => discover::execute(turn, next).await,
    }
}

impl Turn<'_> {
    /// Language of this conversation, falling back to the configured default.
    pub(crate) fn language(&self) -> &str {
        if self.session.language.is_empty() {
            &self.engine.settings.default_language
        } else {
            &self.session.language
        }
    }

    pub(crate) fn texts(&self) -> &'static Texts {
        Locale::from_code(self.language()).texts()
    }

    /// Upsert the sender and resolve their language.
    pub(crate) async fn register_sender(&self) -> Result<String, EngineError> {
        let sender = self.sender.ok_or(EngineError::MissingSender)?;
        self.engine.users.upsert_user(sender.to_chat_user()).await?;
        Ok(self
            .engine
            .settings
            .resolve_language(sender.language_code.as_deref()))
    }

    const fn message_id(&self) -> Option<MessageId> {
        match &self.trigger {
            Trigger::Callback { message_id, .. } => *message_id,
            Trigger::UserMessage => None,
        }
    }

    pub(crate) const fn callback_data(&self) -> Option<&CallbackData> {
        match &self.trigger {
            Trigger::Callback { data, .. } => Some(data),
            Trigger::UserMessage => None,
        }
    }

    async fn answer_callback(&self) {
        if let Trigger::Callback { query_id, .. } = &self.trigger {
            if let Err(e) = self.engine.messenger.answer_callback(query_id).await {
                debug!("Failed to answer callback query {query_id}: {e}");
            }
        }
    }

    pub(crate) async fn send(&self, reply: Reply) -> bool {
        let result = self.engine.messenger.send_message(self.chat_id, reply).await;
        self.engine.deliver(self.chat_id.0, result).await
    }

    /// Replace the message carrying the pressed button, or send a new one
    /// when there is none.
    pub(crate) async fn edit(&self, reply: Reply) -> bool {
        let Some(message_id) = self.message_id() else {
            return self.send(reply).await;
        };
        let result = self
            .engine
            .messenger
            .edit_message(self.chat_id, message_id, reply)
            .await;
        self.engine.deliver(self.chat_id.0, result).await
    }

    /// Remove the keyboard of the message carrying the pressed button.
    pub(crate) async fn strip_keyboard(&self) -> bool {
        let Some(message_id) = self.message_id() else {
            return false;
        };
        let result = self
            .engine
            .messenger
            .edit_keyboard(self.chat_id, message_id, None)
            .await;
        self.engine.deliver(self.chat_id.0, result).await
    }

    pub(crate) async fn delete_trigger_message(&self) -> bool {
        let Some(message_id) = self.message_id() else {
            return false;
        };
        let result = self
            .engine
            .messenger
            .delete_message(self.chat_id, message_id)
            .await;
        self.engine.deliver(self.chat_id.0, result).await
    }

    async fn send_photo(&self, url: &str) -> bool {
        let result = self.engine.messenger.send_photo(self.chat_id, url).await;
        self.engine.deliver(self.chat_id.0, result).await
    }

    /// Send one card per movie with the results keyboard under the last one.
    ///
    /// An empty page becomes a single "That's all" message which replaces the
    /// pressed message, or is sent fresh when the user typed the query.
    pub(crate) async fn render_results(&self, page: MoviePage) -> Result<(), EngineError> {
        let t = self.texts();
        if page.results.is_empty() {
            let reply = Reply::text(t.no_more_results).with_keyboard(results_keyboard(t, false));
            match self.trigger {
                Trigger::Callback { .. } => self.edit(reply).await,
                Trigger::UserMessage => self.send(reply).await,
            };
            return Ok(());
        }

        let settings = &self.engine.settings;
        let genres = self.engine.catalog.genres(self.language()).await?;
        let keyboard = results_keyboard(t, page.has_more());
        let last = page.results.len() - 1;

        for (index, movie) in page.results.iter().enumerate() {
            if let Some(url) = image_url(settings, movie) {
                if !self.send_photo(&url).await && self.blocked().await {
                    return Ok(());
                }
            }
            let card = render_movie_card(settings, movie, &genres, t, false);
            let reply =
                Reply::html(card).with_optional_keyboard((index == last).then(|| keyboard.clone()));
            if !self.send(reply).await && self.blocked().await {
                return Ok(());
            }
        }
        Ok(())
    }

    /// Whether the chat user has been flagged as blocking the bot.
    async fn blocked(&self) -> bool {
        matches!(
            self.engine.users.get_user(self.chat_id.0).await,
            Ok(Some(user)) if user.is_blocked_bot
        )
    }
}

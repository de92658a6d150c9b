use crate::bot::engine::{ConversationEngine, EngineError};
use crate::bot::event::InlineEvent;
use crate::bot::texts::Locale;
use crate::bot::views::inline_article;
use cinebot_core::config::{INLINE_RESULTS_LIMIT, INLINE_SEARCH_PAGES};
use std::collections::HashSet;
use tracing::debug;

/// Answer an inline query with up to [`INLINE_RESULTS_LIMIT`] unique
/// search results gathered from the first [`INLINE_SEARCH_PAGES`] pages.
pub(crate) async fn search(
    engine: &ConversationEngine,
    query: &InlineEvent,
) -> Result<(), EngineError> {
    engine
        .users
        .upsert_user(query.sender.to_chat_user())
        .await?;

    let keyword = query.query.trim();
    if keyword.is_empty() {
        debug!("Ignoring empty inline query {}", query.query_id);
        return Ok(());
    }
    let language = engine
        .settings
        .resolve_language(query.sender.language_code.as_deref());

    let mut seen = HashSet::new();
    let mut movies = Vec::new();
    for page_number in 1..=INLINE_SEARCH_PAGES {
        let page = engine.catalog.search(keyword, page_number, &language).await?;
        let has_more = page.has_more();
        movies.extend(page.results.into_iter().filter(|m| seen.insert(m.id)));
        if !has_more || movies.len() >= INLINE_RESULTS_LIMIT {
            break;
        }
    }
    movies.truncate(INLINE_RESULTS_LIMIT);

    let genres = engine.catalog.genres(&language).await?;
    let t = Locale::from_code(&language).texts();
    let results = movies
        .iter()
        .map(|movie| inline_article(&engine.settings, movie, &genres, t))
        .collect();

    let result = engine.messenger.answer_inline(&query.query_id, results).await;
    engine.deliver(query.sender.id, result).await;
    Ok(())
}

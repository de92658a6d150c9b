//! Keyword search and curated lists.

use super::Turn;
use crate::bot::engine::EngineError;
use crate::bot::messenger::Reply;
use crate::bot::state::{SearchQuery, State};
use cinebot_core::movies::CuratedList;
use tracing::debug;

pub(super) async fn search_prompt(turn: &mut Turn<'_>) -> Result<(), EngineError> {
    let t = turn.texts();
    let reply = Reply::text(t.search_prompt);

    // After a previous search the menu stays in history, only its keyboard goes.
    if turn.session.search.take().is_some() {
        turn.strip_keyboard().await;
        turn.send(reply).await;
    } else {
        turn.edit(reply).await;
    }
    turn.session.state = Some(State::SearchingMovies);
    Ok(())
}

pub(super) async fn search(turn: &mut Turn<'_>, keyword: String) -> Result<(), EngineError> {
    let page = turn
        .engine
        .catalog
        .search(&keyword, 1, turn.language())
        .await?;
    turn.session.search = Some(SearchQuery { keyword, page: 1 });
    turn.session.state = Some(State::DisplayingMovies);
    turn.render_results(page).await
}

pub(super) async fn search_next(turn: &mut Turn<'_>) -> Result<(), EngineError> {
    let Some(mut query) = turn.session.search.clone() else {
        debug!("No search to continue in chat {}", turn.chat_id.0);
        return Ok(());
    };
    query.page += 1;

    let page = turn
        .engine
        .catalog
        .search(&query.keyword, query.page, turn.language())
        .await?;
    turn.session.search = Some(query);
    turn.render_results(page).await
}

/// A curated list; `None` continues the current one with its next page.
pub(super) async fn list(
    turn: &mut Turn<'_>,
    list: Option<CuratedList>,
) -> Result<(), EngineError> {
    let (list, next) = match (list, turn.session.list_query) {
        (Some(list), _) => (list, false),
        (None, Some(current)) => (current.list, true),
        (None, None) => {
            debug!("No list to continue in chat {}", turn.chat_id.0);
            return Ok(());
        }
    };

    let page_number = turn.session.list_page(list, next);
    let page = turn
        .engine
        .catalog
        .list(list, page_number, turn.language())
        .await?;
    turn.session.state = Some(State::ListingMovies);
    turn.render_results(page).await
}

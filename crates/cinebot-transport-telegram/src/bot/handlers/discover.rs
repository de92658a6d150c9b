//! Discovery sub-flow: collecting filters and running the discover query.

use super::Turn;
use crate::bot::actions::CallbackData;
use crate::bot::engine::EngineError;
use crate::bot::messenger::Reply;
use crate::bot::state::{DiscoverState, State};
use crate::bot::views::{
    discover_menu, genres_keyboard, render_search_params, search_params_keyboard, years_keyboard,
};
use chrono::Datelike;
use cinebot_core::discover::{DiscoverQuery, FilterKind, FilterSet};
use tracing::debug;

/// Show the discover menu, first committing the value picked on a filter
/// keyboard if one was shown.
pub(super) async fn enter(turn: &mut Turn<'_>) -> Result<(), EngineError> {
    let pending = turn.session.pending_filter.take();
    let value = match turn.callback_data() {
        Some(CallbackData::Value(value)) => Some(value.clone()),
        _ => None,
    };
    let filters = turn.session.filters.get_or_insert_with(FilterSet::new);

    let committed = match (pending, value) {
        (Some(kind), Some(value)) => {
            if !filters.add(kind, value.as_str()) {
                debug!("Filter {kind:?}={value} is already selected");
            }
            Some(kind)
        }
        _ => None,
    };

    let t = turn.texts();
    let prompt = match committed {
        Some(FilterKind::Genres) => t.discover_prompt_after_genre,
        Some(FilterKind::Years) => t.discover_prompt_after_years,
        None => t.discover_prompt,
    };
    turn.edit(Reply::text(prompt).with_keyboard(discover_menu(t)))
        .await;
    turn.session.state = Some(State::Discovering(DiscoverState::Menu));
    Ok(())
}

pub(super) async fn select_filter(
    turn: &mut Turn<'_>,
    kind: FilterKind,
) -> Result<(), EngineError> {
    let t = turn.texts();
    let reply = match kind {
        FilterKind::Genres => {
            let genres = turn.engine.catalog.genres(turn.language()).await?;
            Reply::text(t.genres_prompt).with_keyboard(genres_keyboard(&genres, t))
        }
        FilterKind::Years => {
            let current_year = chrono::Utc::now().year();
            Reply::text(t.years_prompt).with_keyboard(years_keyboard(current_year, t))
        }
    };

    turn.edit(reply).await;
    turn.session.pending_filter = Some(kind);
    turn.session.state = Some(State::Discovering(DiscoverState::SelectingSearchParam));
    Ok(())
}

pub(super) async fn show_params(turn: &mut Turn<'_>) -> Result<(), EngineError> {
    let t = turn.texts();
    let genres = turn.engine.catalog.genres(turn.language()).await?;
    let filters = turn.session.filters.clone().unwrap_or_default();
    let text = render_search_params(&filters, &genres, t);

    turn.edit(Reply::html(text).with_keyboard(search_params_keyboard(t)))
        .await;
    turn.session.state = Some(State::Discovering(DiscoverState::ShowingSearchParams));
    Ok(())
}

/// Run the discover query; the state is left unchanged.
pub(super) async fn execute(turn: &mut Turn<'_>, next: bool) -> Result<(), EngineError> {
    let page_number = if next {
        turn.session.discover_page.max(1) + 1
    } else {
        1
    };
    let filters = turn.session.filters.clone().unwrap_or_default();
    let query = DiscoverQuery::from_filters(&filters, turn.language(), page_number);

    let page = turn.engine.catalog.discover(&query).await?;
    turn.session.discover_page = page_number;
    turn.render_results(page).await
}

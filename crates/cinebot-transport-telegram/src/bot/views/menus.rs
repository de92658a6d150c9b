//! Inline keyboards.

use crate::bot::actions::Action;
use crate::bot::texts::Texts;
use cinebot_core::discover::year_bands;
use cinebot_core::movies::{CuratedList, GenreMap};
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

fn button(text: &str, action: Action) -> InlineKeyboardButton {
    InlineKeyboardButton::callback(text, action.as_str())
}

fn back_row(t: &Texts) -> Vec<InlineKeyboardButton> {
    vec![button(t.back, Action::End)]
}

/// Root menu: discover, search, curated lists and Done.
#[must_use]
pub fn root_menu(t: &Texts) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![
            button(t.discover_movies, Action::DiscoverMovies),
            button(t.search_movies, Action::SearchMovies),
        ],
        vec![
            button(t.popular, Action::List(CuratedList::Popular)),
            button(t.top_rated, Action::List(CuratedList::TopRated)),
        ],
        vec![
            button(t.upcoming, Action::List(CuratedList::Upcoming)),
            button(t.now_playing, Action::List(CuratedList::NowPlaying)),
        ],
        vec![button(t.done, Action::End)],
    ])
}

/// Discover menu.
#[must_use]
pub fn discover_menu(t: &Texts) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![button(t.genres_button, Action::SelectGenre)],
        vec![button(t.years_button, Action::SelectYears)],
        vec![button(t.show_data, Action::ShowSearchParams)],
        vec![button(t.discover, Action::Discover)],
        back_row(t),
    ])
}

/// One button per genre, in API order, then Back.
#[must_use]
pub fn genres_keyboard(genres: &GenreMap, t: &Texts) -> InlineKeyboardMarkup {
    let mut rows: Vec<Vec<InlineKeyboardButton>> = genres
        .iter()
        .map(|(id, name)| vec![InlineKeyboardButton::callback(name, id.to_string())])
        .collect();
    rows.push(back_row(t));
    InlineKeyboardMarkup::new(rows)
}

/// Static year bands up to `current_year`, then Back.
#[must_use]
pub fn years_keyboard(current_year: i32, t: &Texts) -> InlineKeyboardMarkup {
    let mut rows: Vec<Vec<InlineKeyboardButton>> = year_bands(current_year)
        .into_iter()
        .map(|(value, label)| vec![InlineKeyboardButton::callback(label, value)])
        .collect();
    rows.push(back_row(t));
    InlineKeyboardMarkup::new(rows)
}

/// Keyboard under the filter display.
#[must_use]
pub fn search_params_keyboard(t: &Texts) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![button(t.discover, Action::Discover)],
        vec![button(t.clear, Action::ClearSearchParams)],
        vec![button(t.back, Action::BackFromShowSearchParams)],
    ])
}

/// Keyboard attached to the last result; `Next movies` only if more pages exist.
#[must_use]
pub fn results_keyboard(t: &Texts, has_more: bool) -> InlineKeyboardMarkup {
    let mut rows = Vec::with_capacity(2);
    if has_more {
        rows.push(vec![button(t.next_movies, Action::NextMovies)]);
    }
    rows.push(back_row(t));
    InlineKeyboardMarkup::new(rows)
}

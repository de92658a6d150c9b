use cinebot_core::discover::{FilterKind, FilterSet};
use cinebot_core::movies::CuratedList;

/// Position of a chat in the conversation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum State {
    /// Root menu is shown
    SelectingAction,
    /// Waiting for search keywords
    SearchingMovies,
    /// Search results are shown
    DisplayingMovies,
    /// Curated list results are shown
    ListingMovies,
    /// Stopped from inside discovery; only a new start is accepted
    Stopping,
    /// Inside the discovery sub-flow
    Discovering(DiscoverState),
}

/// States of the discovery sub-flow.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DiscoverState {
    /// Discover menu (genres, years, show data, discover)
    Menu,
    /// A genre or year keyboard is shown
    SelectingSearchParam,
    /// Accumulated filters are shown
    ShowingSearchParams,
}

/// Last curated list request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ListQuery {
    /// Which list
    pub list: CuratedList,
    /// Page last shown
    pub page: u32,
}

/// Last search request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchQuery {
    /// Keywords entered by the user
    pub keyword: String,
    /// Page last shown
    pub page: u32,
}

/// Per-chat conversation data.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Session {
    /// `None` when no conversation is active
    pub state: Option<State>,
    /// Resolved language for API calls and texts
    pub language: String,
    /// Discovery filters; present only once discovery was entered
    pub filters: Option<FilterSet>,
    /// Filter kind whose keyboard is currently shown
    pub pending_filter: Option<FilterKind>,
    /// Last curated list request
    pub list_query: Option<ListQuery>,
    /// Last search request
    pub search: Option<SearchQuery>,
    /// Last discover page shown
    pub discover_page: u32,
}

impl Session {
    /// A new session at the root menu.
    #[must_use]
    pub fn fresh(language: impl Into<String>) -> Self {
        Self {
            state: Some(State::SelectingAction),
            language: language.into(),
            ..Self::default()
        }
    }

    /// Drop everything except language and state.
    pub fn wipe(&mut self) {
        *self = Self {
            state: self.state,
            language: std::mem::take(&mut self.language),
            ..Self::default()
        };
    }

    /// Page to request for a curated list and remember it.
    ///
    /// A menu selection starts over at page 1 and `next` advances the
    /// current page.
    pub fn list_page(&mut self, list: CuratedList, next: bool) -> u32 {
        let page = match self.list_query {
            Some(query) if next => query.page + 1,
            _ => 1,
        };
        self.list_query = Some(ListQuery { list, page });
        page
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_page_menu_selection_starts_over() {
        let mut session = Session::fresh("en");
        assert_eq!(session.list_page(CuratedList::Popular, false), 1);
        assert_eq!(session.list_page(CuratedList::Popular, true), 2);
        assert_eq!(session.list_page(CuratedList::Popular, true), 3);
        assert_eq!(session.list_page(CuratedList::Popular, false), 1);
        assert_eq!(session.list_page(CuratedList::TopRated, false), 1);
        assert_eq!(
            session.list_query,
            Some(ListQuery {
                list: CuratedList::TopRated,
                page: 1
            })
        );
    }

    #[test]
    fn test_wipe_keeps_language_and_state() {
        let mut session = Session::fresh("ru");
        session.state = Some(State::Discovering(DiscoverState::ShowingSearchParams));
        let mut filters = FilterSet::new();
        filters.add(FilterKind::Genres, "28");
        session.filters = Some(filters);
        session.discover_page = 4;

        session.wipe();
        assert_eq!(session.language, "ru");
        assert_eq!(
            session.state,
            Some(State::Discovering(DiscoverState::ShowingSearchParams))
        );
        assert_eq!(session.filters, None);
        assert_eq!(session.discover_page, 0);
    }
}

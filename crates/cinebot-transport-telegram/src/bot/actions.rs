use cinebot_core::movies::CuratedList;
use std::fmt;

/// Wire value of the Back/Done button.
pub const END: &str = "-1";

/// Known callback identifiers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    /// Start a free-text search
    SearchMovies,
    /// Enter the discovery sub-flow
    DiscoverMovies,
    /// Show a curated list
    List(CuratedList),
    /// Show the genre keyboard
    SelectGenre,
    /// Show the year band keyboard
    SelectYears,
    /// Run the discover query
    Discover,
    /// Show accumulated filters
    ShowSearchParams,
    /// Next page of the current results
    NextMovies,
    /// Drop accumulated filters
    ClearSearchParams,
    /// Leave the filter display
    BackFromShowSearchParams,
    /// Back / Done
    End,
}

impl Action {
    /// Callback data sent with the button.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SearchMovies => "search_movies",
            Self::DiscoverMovies => "discover_movies",
            Self::List(list) => list.as_str(),
            Self::SelectGenre => "select_genre",
            Self::SelectYears => "select_years",
            Self::Discover => "discover",
            Self::ShowSearchParams => "show_search_params",
            Self::NextMovies => "next_movies",
            Self::ClearSearchParams => "clear_search_params",
            Self::BackFromShowSearchParams => "back_from_show_search_params",
            Self::End => END,
        }
    }

    /// Parse callback data; `None` for anything that is not an action.
    #[must_use]
    pub fn parse(data: &str) -> Option<Self> {
        let action = match data {
            "search_movies" => Self::SearchMovies,
            "discover_movies" => Self::DiscoverMovies,
            "select_genre" => Self::SelectGenre,
            "select_years" => Self::SelectYears,
            "discover" => Self::Discover,
            "show_search_params" => Self::ShowSearchParams,
            "next_movies" => Self::NextMovies,
            "clear_search_params" => Self::ClearSearchParams,
            "back_from_show_search_params" => Self::BackFromShowSearchParams,
            END => Self::End,
            other => return other.parse().ok().map(Self::List),
        };
        Some(action)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decoded callback payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CallbackData {
    /// A menu action
    Action(Action),
    /// A raw filter value (genre id or year band)
    Value(String),
}

impl CallbackData {
    /// Decode button data.
    #[must_use]
    pub fn parse(data: &str) -> Self {
        Action::parse(data).map_or_else(|| Self::Value(data.to_string()), Self::Action)
    }

    /// The action, if this payload is one.
    #[must_use]
    pub const fn action(&self) -> Option<Action> {
        match self {
            Self::Action(action) => Some(*action),
            Self::Value(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_round_trip() {
        let actions = [
            Action::SearchMovies,
            Action::DiscoverMovies,
            Action::List(CuratedList::NowPlaying),
            Action::SelectGenre,
            Action::SelectYears,
            Action::Discover,
            Action::ShowSearchParams,
            Action::NextMovies,
            Action::ClearSearchParams,
            Action::BackFromShowSearchParams,
            Action::End,
        ];
        for action in actions {
            assert_eq!(Action::parse(action.as_str()), Some(action));
        }
    }

    #[test]
    fn test_values_are_not_actions() {
        assert_eq!(CallbackData::parse("28"), CallbackData::Value("28".into()));
        assert_eq!(
            CallbackData::parse("2001-2005"),
            CallbackData::Value("2001-2005".into())
        );
        assert_eq!(
            CallbackData::parse("-1"),
            CallbackData::Action(Action::End)
        );
        assert_eq!(
            CallbackData::parse("top_rated").action(),
            Some(Action::List(CuratedList::TopRated))
        );
    }
}

//! User-facing strings for every supported locale.

/// Interface language.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Locale {
    /// English
    #[default]
    En,
    /// Russian
    Ru,
    /// Ukrainian
    Uk,
}

impl Locale {
    /// Locale for a language code; unknown codes fall back to English.
    #[must_use]
    pub fn from_code(code: &str) -> Self {
        match code.split(['-', '_']).next().unwrap_or_default() {
            "ru" => Self::Ru,
            "uk" => Self::Uk,
            _ => Self::En,
        }
    }

    /// Text catalog for this locale.
    #[must_use]
    pub const fn texts(self) -> &'static Texts {
        match self {
            Self::En => &EN,
            Self::Ru => &RU,
            Self::Uk => &UK,
        }
    }
}

/// Static text catalog.
#[derive(Debug)]
pub struct Texts {
    /// Root menu prompt
    pub greeting: &'static str,
    /// Discover movies button
    pub discover_movies: &'static str,
    /// Search movies
    pub search_movies: &'static str,
    /// Popular
    pub popular: &'static str,
    /// Top rated
    pub top_rated: &'static str,
    /// Upcoming
    pub upcoming: &'static str,
    /// Now playing
    pub now_playing: &'static str,
    /// Done
    pub done: &'static str,
    /// Back button
    pub back: &'static str,
    /// Reply to the Done button
    pub see_you: &'static str,
    /// Reply to `/stop`
    pub bye: &'static str,
    /// Search keywords prompt
    pub search_prompt: &'static str,
    /// Genres button
    pub genres_button: &'static str,
    /// Years button
    pub years_button: &'static str,
    /// Show data
    pub show_data: &'static str,
    /// Discover
    pub discover: &'static str,
    /// Clears discovery filters
    pub clear: &'static str,
    /// Discover menu prompt before any filter
    pub discover_prompt: &'static str,
    /// Discover menu prompt after a genre was picked
    pub discover_prompt_after_genre: &'static str,
    /// Discover menu prompt after a year band was picked
    pub discover_prompt_after_years: &'static str,
    /// Genre keyboard prompt
    pub genres_prompt: &'static str,
    /// Year keyboard prompt
    pub years_prompt: &'static str,
    /// Genres label in the filter display
    pub genres_label: &'static str,
    /// Years label
    pub years_label: &'static str,
    /// Next page button
    pub next_movies: &'static str,
    /// Shown when no results are left
    pub no_more_results: &'static str,
    /// Rating label in the movie card
    pub rating_label: &'static str,
    /// Votes label
    pub votes_label: &'static str,
    /// Release label
    pub release_label: &'static str,
}

static EN: Texts = Texts {
    greeting: "Lets find a movie for you...",
    discover_movies: "Discover movies",
    search_movies: "Search movies",
    popular: "Popular",
    top_rated: "Top Rated",
    upcoming: "Upcoming",
    now_playing: "Now playing",
    done: "Done",
    back: "Back",
    see_you: "See you around!",
    bye: "Okay, bye.",
    search_prompt: "Okay, please enter some keywords to search:",
    genres_button: "Genres",
    years_button: "Years range",
    show_data: "Show data",
    discover: "Discover",
    clear: "Clear",
    discover_prompt: "Select options to discover movies:",
    discover_prompt_after_genre: "Now select years or another genre or try to search:",
    discover_prompt_after_years: "Now select genre or try to search:",
    genres_prompt: "Okay, these are genres:",
    years_prompt: "Okay, these are years:",
    genres_label: "Genres",
    years_label: "Years",
    next_movies: "Next movies",
    no_more_results: "That's all",
    rating_label: "Rating",
    votes_label: "votes",
    release_label: "Release date",
};

static RU: Texts = Texts {
    greeting: "Давайте подберём вам фильм...",
    discover_movies: "Подбор фильмов",
    search_movies: "Поиск фильмов",
    popular: "Популярные",
    top_rated: "Лучшие",
    upcoming: "Скоро в кино",
    now_playing: "Сейчас в кино",
    done: "Готово",
    back: "Назад",
    see_you: "До встречи!",
    bye: "Хорошо, пока.",
    search_prompt: "Хорошо, введите ключевые слова для поиска:",
    genres_button: "Жанры",
    years_button: "Годы выхода",
    show_data: "Показать параметры",
    discover: "Подобрать",
    clear: "Очистить",
    discover_prompt: "Выберите параметры подбора фильмов:",
    discover_prompt_after_genre: "Теперь выберите годы или ещё один жанр или начните поиск:",
    discover_prompt_after_years: "Теперь выберите жанр или начните поиск:",
    genres_prompt: "Хорошо, вот жанры:",
    years_prompt: "Хорошо, вот годы:",
    genres_label: "Жанры",
    years_label: "Годы",
    next_movies: "Ещё фильмы",
    no_more_results: "Это всё",
    rating_label: "Рейтинг",
    votes_label: "голосов",
    release_label: "Дата выхода",
};

static UK: Texts = Texts {
    greeting: "Давайте підберемо вам фільм...",
    discover_movies: "Підбір фільмів",
    search_movies: "Пошук фільмів",
    popular: "Популярні",
    top_rated: "Найкращі",
    upcoming: "Незабаром у кіно",
    now_playing: "Зараз у кіно",
    done: "Готово",
    back: "Назад",
    see_you: "До зустрічі!",
    bye: "Гаразд, бувайте.",
    search_prompt: "Гаразд, введіть ключові слова для пошуку:",
    genres_button: "Жанри",
    years_button: "Роки виходу",
    show_data: "Показати параметри",
    discover: "Підібрати",
    clear: "Очистити",
    discover_prompt: "Оберіть параметри підбору фільмів:",
    discover_prompt_after_genre: "Тепер оберіть роки або ще один жанр або почніть пошук:",
    discover_prompt_after_years: "Тепер оберіть жанр або почніть пошук:",
    genres_prompt: "Гаразд, ось жанри:",
    years_prompt: "Гаразд, ось роки:",
    genres_label: "Жанри",
    years_label: "Роки",
    next_movies: "Ще фільми",
    no_more_results: "Це все",
    rating_label: "Рейтинг",
    votes_label: "голосів",
    release_label: "Дата виходу",
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locale_from_code() {
        assert_eq!(Locale::from_code("ru"), Locale::Ru);
        assert_eq!(Locale::from_code("uk-UA"), Locale::Uk);
        assert_eq!(Locale::from_code("de"), Locale::En);
        assert_eq!(Locale::from_code(""), Locale::En);
    }

    #[test]
    fn test_catalogs_are_complete() {
        for locale in [Locale::En, Locale::Ru, Locale::Uk] {
            let t = locale.texts();
            for text in [t.greeting, t.bye, t.see_you, t.no_more_results, t.back] {
                assert!(!text.is_empty(), "{locale:?} has an empty text");
            }
        }
        assert_eq!(Locale::En.texts().no_more_results, "That's all");
    }
}

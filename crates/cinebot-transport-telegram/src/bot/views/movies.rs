//! Movie cards and filter summaries.

use crate::bot::texts::Texts;
use cinebot_core::config::{CoreSettings, SYNOPSIS_MAX_CHARS};
use cinebot_core::discover::{FilterKind, FilterSet};
use cinebot_core::movies::{GenreMap, Movie};
use cinebot_core::utils::{escape_html, truncate_str};
use reqwest::Url;
use teloxide::types::{
    InlineQueryResult, InlineQueryResultArticle, InputMessageContent, InputMessageContentText,
    ParseMode,
};

/// Full backdrop URL of `movie`, if it has one.
#[must_use]
pub fn image_url(settings: &CoreSettings, movie: &Movie) -> Option<String> {
    let path = movie.backdrop_path.as_deref().filter(|p| !p.is_empty())?;
    Some(format!(
        "{}/{}",
        settings.tmdb_image_base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    ))
}

/// Public TMDB page of `movie`.
#[must_use]
pub fn movie_url(settings: &CoreSettings, movie: &Movie) -> String {
    format!(
        "{}/{}",
        settings.tmdb_movie_base_url.trim_end_matches('/'),
        movie.id
    )
}

fn genre_names(movie: &Movie, genres: &GenreMap) -> Vec<String> {
    movie
        .genre_ids
        .iter()
        .filter_map(|id| genres.name(*id))
        .map(str::to_string)
        .collect()
}

/// HTML detail card.
///
/// With `with_image` an invisible link to the backdrop is prepended so the
/// client renders it as a preview (used for inline results, which carry no
/// separate photo).
#[must_use]
pub fn render_movie_card(
    settings: &CoreSettings,
    movie: &Movie,
    genres: &GenreMap,
    t: &Texts,
    with_image: bool,
) -> String {
    let mut card = String::new();
    if with_image {
        if let Some(image) = image_url(settings, movie) {
            card.push_str(&format!("<a href=\"{image}\">&#8205;</a>"));
        }
    }

    card.push_str(&format!(
        "<b><a href=\"{}\">{}</a></b>\n",
        movie_url(settings, movie),
        escape_html(&movie.title)
    ));
    card.push_str(&format!(
        "⭐ {}: {:.1} ({} {})\n",
        t.rating_label, movie.vote_average, movie.vote_count, t.votes_label
    ));
    if let Some(date) = movie.release_date.as_deref().filter(|d| !d.is_empty()) {
        card.push_str(&format!("📅 {}: {}\n", t.release_label, escape_html(date)));
    }
    let names = genre_names(movie, genres);
    if !names.is_empty() {
        card.push_str(&format!("🎭 {}\n", escape_html(&names.join(", "))));
    }
    card.push('\n');
    card.push_str(&escape_html(&truncate_str(&movie.overview, SYNOPSIS_MAX_CHARS)));
    card
}

/// `<b>Genres:</b> …\n<b>Years:</b> …` summary of accumulated filters.
///
/// Genre ids are shown by name when known; an empty kind renders as `-`.
#[must_use]
pub fn render_search_params(filters: &FilterSet, genres: &GenreMap, t: &Texts) -> String {
    let genre_list = filters
        .values(FilterKind::Genres)
        .iter()
        .map(|id| {
            id.parse::<u32>()
                .ok()
                .and_then(|id| genres.name(id))
                .map_or_else(|| escape_html(id), escape_html)
        })
        .collect::<Vec<_>>();
    let years = filters
        .values(FilterKind::Years)
        .iter()
        .map(|band| escape_html(band))
        .collect::<Vec<_>>();

    format!(
        "<b>{}:</b> {}\n<b>{}:</b> {}",
        t.genres_label,
        joined_or_dash(&genre_list),
        t.years_label,
        joined_or_dash(&years)
    )
}

fn joined_or_dash(values: &[String]) -> String {
    if values.is_empty() {
        "-".to_string()
    } else {
        values.join(", ")
    }
}

/// Inline query article for `movie`.
#[must_use]
pub fn inline_article(
    settings: &CoreSettings,
    movie: &Movie,
    genres: &GenreMap,
    t: &Texts,
) -> InlineQueryResult {
    let content = InputMessageContent::Text(
        InputMessageContentText::new(render_movie_card(settings, movie, genres, t, true))
            .parse_mode(ParseMode::Html),
    );

    let mut article = InlineQueryResultArticle::new(movie.id.to_string(), movie.title.clone(), content)
        .description(truncate_str(&movie.overview, SYNOPSIS_MAX_CHARS));
    if let Ok(url) = Url::parse(&movie_url(settings, movie)) {
        article = article.url(url);
    }
    if let Some(thumbnail) = image_url(settings, movie).and_then(|u| Url::parse(&u).ok()) {
        article = article.thumbnail_url(thumbnail);
    }
    InlineQueryResult::Article(article)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bot::texts::Locale;
    use cinebot_core::movies::Genre;

    fn settings() -> CoreSettings {
        serde_json::from_value(serde_json::json!({ "tmdb_api_key": "key" }))
            .unwrap_or_else(|e| panic!("settings fixture: {e}"))
    }

    fn genres() -> GenreMap {
        GenreMap::from_genres(vec![
            Genre {
                id: 28,
                name: "action".into(),
            },
            Genre {
                id: 878,
                name: "science fiction".into(),
            },
        ])
    }

    fn matrix() -> Movie {
        Movie {
            id: 603,
            title: "The Matrix & Co".into(),
            overview: "Neo <wakes> up.".into(),
            vote_average: 8.2,
            vote_count: 25_000,
            release_date: Some("1999-03-30".into()),
            genre_ids: vec![28, 878, 1],
            backdrop_path: Some("/matrix.jpg".into()),
            poster_path: None,
        }
    }

    #[test]
    fn test_urls() {
        let s = settings();
        assert_eq!(
            image_url(&s, &matrix()).as_deref(),
            Some("https://www.themoviedb.org/t/p/w600_and_h900_bestv2/matrix.jpg")
        );
        assert_eq!(movie_url(&s, &matrix()), "https://www.themoviedb.org/movie/603");
        let no_image = Movie {
            backdrop_path: None,
            ..matrix()
        };
        assert_eq!(image_url(&s, &no_image), None);
    }

    #[test]
    fn test_card_escapes_and_names_genres() {
        let card = render_movie_card(&settings(), &matrix(), &genres(), Locale::En.texts(), false);
        assert!(card.contains("The Matrix &amp; Co"));
        assert!(card.contains("Neo &lt;wakes&gt; up."));
        assert!(card.contains("Action, Science Fiction"));
        assert!(card.contains("8.2"));
        assert!(card.contains("1999-03-30"));
        assert!(!card.contains("&#8205;"));
    }

    #[test]
    fn test_card_with_image_link() {
        let card = render_movie_card(&settings(), &matrix(), &genres(), Locale::En.texts(), true);
        assert!(card.starts_with("<a href=\"https://www.themoviedb.org/t/p/"));
    }

    #[test]
    fn test_search_params_display() {
        let mut filters = FilterSet::new();
        filters.add(FilterKind::Years, "2001-2005");
        filters.add(FilterKind::Genres, "28");
        filters.add(FilterKind::Genres, "999");
        let text = render_search_params(&filters, &genres(), Locale::En.texts());
        assert_eq!(text, "<b>Genres:</b> Action, 999\n<b>Years:</b> 2001-2005");
    }

    #[test]
    fn test_search_params_display_empty() {
        let text = render_search_params(&FilterSet::new(), &genres(), Locale::En.texts());
        assert_eq!(text, "<b>Genres:</b> -\n<b>Years:</b> -");
    }
}

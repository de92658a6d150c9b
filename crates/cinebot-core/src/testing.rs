//! Testing helpers.
//!
//! Builders for movie fixtures shared by unit tests.

use crate::movies::Movie;

/// A movie that passes the quality filter with the given rating.
#[must_use]
pub fn movie(id: u64, vote_average: f64) -> Movie {
    Movie {
        id,
        title: format!("Movie {id}"),
        overview: format!("Synopsis of movie {id}"),
        vote_average,
        vote_count: 100,
        release_date: Some("2001-09-11".to_string()),
        genre_ids: vec![28],
        backdrop_path: Some(format!("/backdrop{id}.jpg")),
        poster_path: Some(format!("/poster{id}.jpg")),
    }
}

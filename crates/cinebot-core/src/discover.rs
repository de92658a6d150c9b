//! Discovery filters
//!
//! Accumulates genre and year-band selections made through sequential button
//! presses and turns them into a TMDB discover query.

use crate::config::{DISCOVER_MIN_VOTE_AVERAGE, DISCOVER_MIN_VOTE_COUNT, DISCOVER_SORT_BY};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Kind of a discovery filter. Ordering defines display order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FilterKind {
    /// TMDB genre ids
    Genres,
    /// Release year bands like `1996-2000`
    Years,
}

/// Multimap of filter kind to selected values, duplicates suppressed.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSet {
    values: BTreeMap<FilterKind, Vec<String>>,
}

impl FilterSet {
    /// Create an empty filter set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a value under `kind`. Returns `false` if it was already present.
    pub fn add(&mut self, kind: FilterKind, value: impl Into<String>) -> bool {
        let value = value.into();
        let entry = self.values.entry(kind).or_default();
        if entry.contains(&value) {
            return false;
        }
        entry.push(value);
        true
    }

    /// Values selected for `kind`, in selection order.
    #[must_use]
    pub fn values(&self, kind: FilterKind) -> &[String] {
        self.values.get(&kind).map_or(&[], Vec::as_slice)
    }

    /// Whether no value has been selected at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.values().all(Vec::is_empty)
    }

    /// Year bounds spanning every selected band, as `(min, max)`.
    ///
    /// Bands that do not parse are skipped.
    #[must_use]
    pub fn year_range(&self) -> Option<(i32, i32)> {
        self.values(FilterKind::Years)
            .iter()
            .filter_map(|band| YearBand::parse(band))
            .fold(None, |acc, band| match acc {
                None => Some((band.from, band.to)),
                Some((lo, hi)) => Some((lo.min(band.from), hi.max(band.to))),
            })
    }
}

/// An inclusive range of release years.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct YearBand {
    /// First year of the band
    pub from: i32,
    /// Last year of the band
    pub to: i32,
}

impl YearBand {
    /// Parse `"1996-2000"`. Bounds are normalized so `from <= to`.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        let (from, to) = value.split_once('-')?;
        let from: i32 = from.trim().parse().ok()?;
        let to: i32 = to.trim().parse().ok()?;
        Some(Self {
            from: from.min(to),
            to: from.max(to),
        })
    }
}

/// Year bands offered in the discover menu as `(callback value, label)`.
///
/// The last band is open-ended up to `current_year`.
#[must_use]
pub fn year_bands(current_year: i32) -> Vec<(String, String)> {
    let mut bands: Vec<(String, String)> = vec![("1900-1990".into(), "-1990".into())];
    bands.extend(
        ["1991-1995", "1996-2000", "2001-2005", "2006-2010", "2011-2015"]
            .iter()
            .map(|band| ((*band).to_string(), (*band).to_string())),
    );
    let last = format!("2016-{current_year}");
    bands.push((last.clone(), last));
    bands
}

/// Structured TMDB `/discover/movie` request.
#[derive(Clone, Debug, PartialEq)]
pub struct DiscoverQuery {
    /// Response language
    pub language: String,
    /// Sort order
    pub sort_by: String,
    /// Whether adult titles are included
    pub include_adult: bool,
    /// Minimum average rating
    pub vote_average_gte: u32,
    /// Minimum vote count
    pub vote_count_gte: u32,
    /// Requested page (1-based)
    pub page: u32,
    /// Genre ids, any order
    pub with_genres: Vec<String>,
    /// `primary_release_date.gte`, `YYYY-MM-DD`
    pub release_date_gte: Option<String>,
    /// `primary_release_date.lte`, `YYYY-MM-DD`
    pub release_date_lte: Option<String>,
}

impl DiscoverQuery {
    /// Translate accumulated filters into a query with the fixed defaults.
    #[must_use]
    pub fn from_filters(filters: &FilterSet, language: &str, page: u32) -> Self {
        let (release_date_gte, release_date_lte) = filters
            .year_range()
            .map(|(from, to)| (Some(format!("{from}-01-01")), Some(format!("{to}-12-31"))))
            .unwrap_or((None, None));

        Self {
            language: language.to_string(),
            sort_by: DISCOVER_SORT_BY.to_string(),
            include_adult: true,
            vote_average_gte: DISCOVER_MIN_VOTE_AVERAGE,
            vote_count_gte: DISCOVER_MIN_VOTE_COUNT,
            page: page.max(1),
            with_genres: filters.values(FilterKind::Genres).to_vec(),
            release_date_gte,
            release_date_lte,
        }
    }

    /// Query-string parameters in TMDB naming.
    #[must_use]
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = vec![
            ("language".to_string(), self.language.clone()),
            ("sort_by".to_string(), self.sort_by.clone()),
            ("include_adult".to_string(), self.include_adult.to_string()),
            (
                "vote_average.gte".to_string(),
                self.vote_average_gte.to_string(),
            ),
            ("vote_count.gte".to_string(), self.vote_count_gte.to_string()),
            ("page".to_string(), self.page.to_string()),
        ];
        if !self.with_genres.is_empty() {
            params.push(("with_genres".to_string(), self.with_genres.join(",")));
        }
        if let Some(gte) = &self.release_date_gte {
            params.push(("primary_release_date.gte".to_string(), gte.clone()));
        }
        if let Some(lte) = &self.release_date_lte {
            params.push(("primary_release_date.lte".to_string(), lte.clone()));
        }
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn param<'a>(params: &'a [(String, String)], key: &str) -> Option<&'a str> {
        params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn test_add_suppresses_duplicates() {
        let mut filters = FilterSet::new();
        assert!(filters.add(FilterKind::Genres, "28"));
        assert!(!filters.add(FilterKind::Genres, "28"));
        assert!(filters.add(FilterKind::Genres, "35"));
        assert_eq!(filters.values(FilterKind::Genres), ["28", "35"]);
        assert!(filters.values(FilterKind::Years).is_empty());
    }

    #[test]
    fn test_is_empty() {
        let mut filters = FilterSet::new();
        assert!(filters.is_empty());
        filters.add(FilterKind::Years, "1991-1995");
        assert!(!filters.is_empty());
    }

    #[test]
    fn test_year_range_spans_all_bands() {
        let mut filters = FilterSet::new();
        filters.add(FilterKind::Years, "2006-2010");
        filters.add(FilterKind::Years, "1996-2000");
        assert_eq!(filters.year_range(), Some((1996, 2010)));
    }

    #[test]
    fn test_year_band_parse() {
        assert_eq!(
            YearBand::parse("1900-1990"),
            Some(YearBand { from: 1900, to: 1990 })
        );
        assert_eq!(
            YearBand::parse("2010-2006"),
            Some(YearBand { from: 2006, to: 2010 })
        );
        assert_eq!(YearBand::parse("-1990"), None);
        assert_eq!(YearBand::parse("abc"), None);
    }

    #[test]
    fn test_year_bands_end_with_current_year() {
        let bands = year_bands(2026);
        assert_eq!(bands.len(), 7);
        assert_eq!(bands[0], ("1900-1990".to_string(), "-1990".to_string()));
        assert_eq!(
            bands[6],
            ("2016-2026".to_string(), "2016-2026".to_string())
        );
    }

    #[test]
    fn test_query_defaults() {
        let query = DiscoverQuery::from_filters(&FilterSet::new(), "ru", 1);
        let params = query.to_params();
        assert_eq!(param(&params, "language"), Some("ru"));
        assert_eq!(param(&params, "sort_by"), Some("popularity.desc"));
        assert_eq!(param(&params, "include_adult"), Some("true"));
        assert_eq!(param(&params, "vote_average.gte"), Some("6"));
        assert_eq!(param(&params, "vote_count.gte"), Some("200"));
        assert_eq!(param(&params, "page"), Some("1"));
        assert_eq!(param(&params, "with_genres"), None);
        assert_eq!(param(&params, "primary_release_date.gte"), None);
    }

    #[test]
    fn test_query_release_range_from_bands() {
        let mut filters = FilterSet::new();
        filters.add(FilterKind::Years, "1996-2000");
        filters.add(FilterKind::Years, "2006-2010");
        let params = DiscoverQuery::from_filters(&filters, "en", 1).to_params();
        assert_eq!(param(&params, "primary_release_date.gte"), Some("1996-01-01"));
        assert_eq!(param(&params, "primary_release_date.lte"), Some("2010-12-31"));
    }

    #[test]
    fn test_query_genres_joined() {
        let mut filters = FilterSet::new();
        filters.add(FilterKind::Genres, "28");
        filters.add(FilterKind::Genres, "12");
        let query = DiscoverQuery::from_filters(&filters, "en", 3);
        assert_eq!(query.page, 3);
        assert_eq!(param(&query.to_params(), "with_genres"), Some("28,12"));
    }
}

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::Result;

pub mod kitsu;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Anime {
    pub id: String,
    pub canonical_title: String,
    pub synopsis: Option<String>,
    pub poster_image: Option<ImageSet>,
    pub cover_image: Option<ImageSet>,
    /// Average rating on the API's 0-100 scale, string-encoded (e.g. "82.31").
    pub average_rating: Option<String>,
    pub status: Option<AnimeStatus>,
    pub episode_count: Option<u32>,
    pub start_date: Option<NaiveDate>,
    pub genres: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Episode {
    pub id: String,
    pub canonical_title: String,
    pub synopsis: Option<String>,
    pub number: u32,
    pub airdate: Option<NaiveDate>,
    pub thumbnail: Option<ImageSet>,
}

/// Image URLs at the sizes the API provides. Posters carry all five slots,
/// covers omit `medium`, episode thumbnails usually carry `original` only.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ImageSet {
    pub tiny: Option<String>,
    pub small: Option<String>,
    pub medium: Option<String>,
    pub large: Option<String>,
    pub original: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnimeStatus {
    Current,
    Finished,
    Upcoming,
    Unreleased,
    Tba,
}

impl AnimeStatus {
    pub(crate) fn from_api(status: &str) -> Self {
        match status {
            "current" => AnimeStatus::Current,
            "finished" => AnimeStatus::Finished,
            "upcoming" => AnimeStatus::Upcoming,
            "unreleased" => AnimeStatus::Unreleased,
            _ => AnimeStatus::Tba,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AgeRating {
    G,
    Pg,
    R,
    R18,
}

impl AgeRating {
    pub fn as_query_param(&self) -> &'static str {
        match self {
            AgeRating::G => "G",
            AgeRating::Pg => "PG",
            AgeRating::R => "R",
            AgeRating::R18 => "R18",
        }
    }
}

/// Optional narrowing criteria for catalog search. `Default` means no
/// filtering at all.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchFilters {
    pub genres: Vec<String>,
    pub year: Option<u16>,
    pub age_rating: Option<AgeRating>,
    /// Minimum score on a 0-5 scale; rescaled x20 before transmission.
    pub min_score: Option<f64>,
}

/// One page of results plus the backend's total item count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub per_page: u32,
}

impl<T> Page<T> {
    pub fn total_pages(&self) -> u64 {
        if self.per_page == 0 {
            return 0;
        }
        self.total.div_ceil(self.per_page as u64)
    }
}

#[async_trait::async_trait]
pub trait MetadataProvider {
    /// Paginated catalog search. `page` starts at 1.
    async fn search(
        &self,
        query: &str,
        filters: &SearchFilters,
        page: u32,
        per_page: u32,
        locale: &str,
    ) -> Result<Page<Anime>>;

    /// Currently trending titles, a fixed 20 at most.
    async fn trending(&self, locale: &str) -> Result<Vec<Anime>>;

    /// Highest-rated titles, a fixed 20 at most.
    async fn popular(&self, locale: &str) -> Result<Vec<Anime>>;

    /// Full record for one anime. Fails with `Error::NotFound` when the
    /// backend has no such id.
    async fn get_details(&self, id: &str, locale: &str) -> Result<Anime>;

    /// Episode list sorted ascending by number. Returns at most the first
    /// 20 episodes.
    async fn get_episodes(&self, id: &str, locale: &str) -> Result<Vec<Episode>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page_of(total: u64, per_page: u32) -> Page<Anime> {
        Page {
            items: Vec::new(),
            total,
            page: 1,
            per_page,
        }
    }

    #[test]
    fn total_pages_rounds_up() {
        assert_eq!(page_of(41, 20).total_pages(), 3);
        assert_eq!(page_of(40, 20).total_pages(), 2);
        assert_eq!(page_of(1, 20).total_pages(), 1);
    }

    #[test]
    fn total_pages_empty_catalog() {
        assert_eq!(page_of(0, 20).total_pages(), 0);
    }

    #[test]
    fn status_maps_api_strings() {
        assert_eq!(AnimeStatus::from_api("current"), AnimeStatus::Current);
        assert_eq!(AnimeStatus::from_api("finished"), AnimeStatus::Finished);
        assert_eq!(AnimeStatus::from_api("upcoming"), AnimeStatus::Upcoming);
        assert_eq!(AnimeStatus::from_api("unreleased"), AnimeStatus::Unreleased);
        assert_eq!(AnimeStatus::from_api("tba"), AnimeStatus::Tba);
    }

    #[test]
    fn status_falls_back_on_unknown() {
        assert_eq!(AnimeStatus::from_api("who knows"), AnimeStatus::Tba);
    }

    #[test]
    fn age_rating_query_params() {
        assert_eq!(AgeRating::G.as_query_param(), "G");
        assert_eq!(AgeRating::Pg.as_query_param(), "PG");
        assert_eq!(AgeRating::R18.as_query_param(), "R18");
    }
}

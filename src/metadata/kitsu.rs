use std::collections::HashMap;

use chrono::NaiveDate;
use reqwest::{Client, StatusCode, header};
use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::metadata::{
    Anime, AnimeStatus, Episode, ImageSet, MetadataProvider, Page, SearchFilters,
};

pub const KITSU_API_BASE: &str = "https://kitsu.io/api/edge";

const ANIME_FIELDS: &str =
    "canonicalTitle,synopsis,posterImage,coverImage,averageRating,status,episodeCount,startDate,genres";
const EPISODE_FIELDS: &str = "canonicalTitle,synopsis,number,airdate,thumbnail";

pub struct KitsuClient {
    client: Client,
    base_url: String,
}

impl KitsuClient {
    pub fn new() -> Self {
        Self::with_base_url(KITSU_API_BASE)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/vnd.api+json"),
        );
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/vnd.api+json"),
        );

        let client = Client::builder()
            .user_agent("mitai/0.1")
            .default_headers(headers)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: base_url.into(),
        }
    }

    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            Err(Error::Metadata { status, message })
        }
    }
}

impl Default for KitsuClient {
    fn default() -> Self {
        Self::new()
    }
}

// JSON:API envelope. Attributes stay as raw values until we know which
// resource type we are looking at.

#[derive(Debug, Deserialize)]
struct ListDocument {
    data: Vec<Resource>,
    included: Option<Vec<Resource>>,
    meta: Option<DocumentMeta>,
}

#[derive(Debug, Deserialize)]
struct SingleDocument {
    data: Resource,
    included: Option<Vec<Resource>>,
}

#[derive(Debug, Deserialize)]
struct Resource {
    id: String,
    #[serde(rename = "type")]
    kind: String,
    attributes: serde_json::Value,
    relationships: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct DocumentMeta {
    count: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnimeAttributes {
    canonical_title: Option<String>,
    synopsis: Option<String>,
    poster_image: Option<ImageSet>,
    cover_image: Option<ImageSet>,
    average_rating: Option<String>,
    status: Option<String>,
    episode_count: Option<u32>,
    start_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EpisodeAttributes {
    canonical_title: Option<String>,
    synopsis: Option<String>,
    number: Option<u32>,
    airdate: Option<NaiveDate>,
    thumbnail: Option<ImageSet>,
}

fn search_params(
    query: &str,
    filters: &SearchFilters,
    page: u32,
    per_page: u32,
) -> Vec<(String, String)> {
    let offset = page.saturating_sub(1) as u64 * per_page as u64;
    let mut params = vec![
        ("page[limit]".to_string(), per_page.to_string()),
        ("page[offset]".to_string(), offset.to_string()),
        ("fields[anime]".to_string(), ANIME_FIELDS.to_string()),
        ("include".to_string(), "genres".to_string()),
    ];

    if !query.is_empty() {
        params.push(("filter[text]".to_string(), query.to_string()));
    }

    if !filters.genres.is_empty() {
        params.push(("filter[categories]".to_string(), filters.genres.join(",")));
    }

    if let Some(year) = filters.year {
        params.push(("filter[seasonYear]".to_string(), year.to_string()));
    }

    if let Some(rating) = filters.age_rating {
        params.push((
            "filter[ageRating]".to_string(),
            rating.as_query_param().to_string(),
        ));
    }

    // The API rates on a 0-100 scale; callers pass 0-5. Open-ended range,
    // lower bound only.
    if let Some(min_score) = filters.min_score {
        params.push((
            "filter[averageRating]".to_string(),
            format!("{}..", min_score * 20.0),
        ));
    }

    params
}

/// Index `included` genre resources by id so relationship references can be
/// resolved to names.
fn genre_index(included: &[Resource]) -> HashMap<String, String> {
    included
        .iter()
        .filter(|resource| resource.kind == "genres")
        .filter_map(|resource| {
            let name = resource.attributes.get("name")?.as_str()?;
            Some((resource.id.clone(), name.to_string()))
        })
        .collect()
}

fn linked_genres(
    relationships: Option<&serde_json::Value>,
    genres: &HashMap<String, String>,
) -> Vec<String> {
    relationships
        .and_then(|r| r.get("genres"))
        .and_then(|g| g.get("data"))
        .and_then(|d| d.as_array())
        .map(|refs| {
            refs.iter()
                .filter_map(|entry| entry.get("id").and_then(|id| id.as_str()))
                .filter_map(|id| genres.get(id).cloned())
                .collect()
        })
        .unwrap_or_default()
}

fn anime_from_resource(resource: Resource, genres: &HashMap<String, String>) -> Option<Anime> {
    let genre_names = linked_genres(resource.relationships.as_ref(), genres);
    let attrs: AnimeAttributes = serde_json::from_value(resource.attributes).ok()?;

    Some(Anime {
        id: resource.id,
        canonical_title: attrs.canonical_title?,
        synopsis: attrs.synopsis,
        poster_image: attrs.poster_image,
        cover_image: attrs.cover_image,
        average_rating: attrs.average_rating,
        status: attrs.status.as_deref().map(AnimeStatus::from_api),
        episode_count: attrs.episode_count,
        start_date: attrs.start_date,
        genres: genre_names,
    })
}

fn episode_from_resource(resource: Resource) -> Option<Episode> {
    let attrs: EpisodeAttributes = serde_json::from_value(resource.attributes).ok()?;

    Some(Episode {
        id: resource.id,
        canonical_title: attrs.canonical_title.unwrap_or_default(),
        synopsis: attrs.synopsis,
        number: attrs.number?,
        airdate: attrs.airdate,
        thumbnail: attrs.thumbnail,
    })
}

fn map_anime_list(document: ListDocument) -> Vec<Anime> {
    let genres = genre_index(document.included.as_deref().unwrap_or(&[]));
    document
        .data
        .into_iter()
        .filter_map(|resource| anime_from_resource(resource, &genres))
        .collect()
}

fn map_episodes(document: ListDocument) -> Vec<Episode> {
    let mut episodes: Vec<Episode> = document
        .data
        .into_iter()
        .filter_map(episode_from_resource)
        .collect();
    episodes.sort_by_key(|episode| episode.number);
    episodes
}

fn map_anime_document(document: SingleDocument) -> Result<Anime> {
    let genres = genre_index(document.included.as_deref().unwrap_or(&[]));
    anime_from_resource(document.data, &genres)
        .ok_or_else(|| Error::Parse("anime resource missing required attributes".to_string()))
}

#[async_trait::async_trait]
impl MetadataProvider for KitsuClient {
    async fn search(
        &self,
        query: &str,
        filters: &SearchFilters,
        page: u32,
        per_page: u32,
        locale: &str,
    ) -> Result<Page<Anime>> {
        let page = page.max(1);
        let per_page = per_page.max(1);
        let url = format!("{}/anime", self.base_url);

        debug!(url = %url, page, per_page, "Searching catalog");

        let response = self
            .client
            .get(&url)
            .query(&search_params(query, filters, page, per_page))
            .header(header::ACCEPT_LANGUAGE, locale)
            .send()
            .await?;

        let response = Self::check_response(response).await?;
        let document: ListDocument = response
            .json()
            .await
            .map_err(|e| Error::Parse(e.to_string()))?;

        let total = document.meta.as_ref().and_then(|m| m.count).unwrap_or(0);
        let items = map_anime_list(document);
        debug!(count = items.len(), total, "Parsed catalog page");

        Ok(Page {
            items,
            total,
            page,
            per_page,
        })
    }

    async fn trending(&self, locale: &str) -> Result<Vec<Anime>> {
        let url = format!("{}/trending/anime", self.base_url);
        debug!(url = %url, "Fetching trending anime");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("fields[anime]", ANIME_FIELDS),
                ("include", "genres"),
                ("page[limit]", "20"),
            ])
            .header(header::ACCEPT_LANGUAGE, locale)
            .send()
            .await?;

        let response = Self::check_response(response).await?;
        let document: ListDocument = response
            .json()
            .await
            .map_err(|e| Error::Parse(e.to_string()))?;
        Ok(map_anime_list(document))
    }

    async fn popular(&self, locale: &str) -> Result<Vec<Anime>> {
        let url = format!("{}/anime", self.base_url);
        debug!(url = %url, "Fetching popular anime");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("sort", "-averageRating"),
                ("fields[anime]", ANIME_FIELDS),
                ("include", "genres"),
                ("page[limit]", "20"),
            ])
            .header(header::ACCEPT_LANGUAGE, locale)
            .send()
            .await?;

        let response = Self::check_response(response).await?;
        let document: ListDocument = response
            .json()
            .await
            .map_err(|e| Error::Parse(e.to_string()))?;
        Ok(map_anime_list(document))
    }

    async fn get_details(&self, id: &str, locale: &str) -> Result<Anime> {
        let url = format!("{}/anime/{}", self.base_url, id);
        debug!(url = %url, "Fetching anime details");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("include", "episodes,genres"),
                ("fields[episodes]", EPISODE_FIELDS),
            ])
            .header(header::ACCEPT_LANGUAGE, locale)
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(Error::NotFound(id.to_string()));
        }

        let response = Self::check_response(response).await?;
        let document: SingleDocument = response
            .json()
            .await
            .map_err(|e| Error::Parse(e.to_string()))?;
        map_anime_document(document)
    }

    async fn get_episodes(&self, id: &str, locale: &str) -> Result<Vec<Episode>> {
        let url = format!("{}/anime/{}/episodes", self.base_url, id);
        debug!(url = %url, "Fetching episode list");

        let response = self
            .client
            .get(&url)
            .query(&[("page[limit]", "20"), ("sort", "number")])
            .header(header::ACCEPT_LANGUAGE, locale)
            .send()
            .await?;

        let response = Self::check_response(response).await?;
        let document: ListDocument = response
            .json()
            .await
            .map_err(|e| Error::Parse(e.to_string()))?;

        let episodes = map_episodes(document);
        debug!(count = episodes.len(), "Parsed episode list");
        Ok(episodes)
    }
}

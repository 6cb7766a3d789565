use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use crate::error::{Error, Result};
use crate::streams::{StreamCandidate, StreamProvider};

pub const ANIMEFLV_BASE_URL: &str = "https://www3.animeflv.net";

pub struct AnimeFlvClient {
    client: reqwest::Client,
    base_url: String,
}

impl AnimeFlvClient {
    pub fn new() -> Self {
        Self::with_base_url(ANIMEFLV_BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent("mitai/0.1")
                .build()
                .expect("Failed to create HTTP client"),
            base_url: base_url.into(),
        }
    }

    async fn fetch_page(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(Error::AnimeFlv(format!(
                "HTTP error: {}",
                response.status()
            )));
        }

        Ok(response.text().await?)
    }
}

impl Default for AnimeFlvClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Slug of the first search hit. The site wraps each result's title node in
/// the anchor linking to its detail page, so the slug is the trailing path
/// segment of that anchor's href.
fn parse_first_slug(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let title_selector = Selector::parse(".Title").expect("Invalid title selector");

    let first = document.select(&title_selector).next()?;
    let anchor = first.parent().and_then(ElementRef::wrap)?;
    let href = anchor.attr("href")?;
    slug_from_href(href)
}

fn slug_from_href(href: &str) -> Option<String> {
    href.rsplit('/')
        .find(|segment| !segment.is_empty())
        .map(|segment| segment.to_string())
}

/// Server label / URL pairs from the viewer page's download table, in
/// document order. Anchors missing either half are skipped.
fn parse_stream_candidates(html: &str) -> Vec<StreamCandidate> {
    let document = Html::parse_document(html);
    let link_selector = Selector::parse(".RTbl.Dl a").expect("Invalid link selector");

    document
        .select(&link_selector)
        .filter_map(|anchor| {
            let url = anchor.attr("href").unwrap_or("");
            let server = anchor.text().collect::<String>().trim().to_string();
            if url.is_empty() || server.is_empty() {
                return None;
            }
            Some(StreamCandidate {
                server,
                url: url.to_string(),
            })
        })
        .collect()
}

#[async_trait::async_trait]
impl StreamProvider for AnimeFlvClient {
    async fn locate(&self, title: &str) -> Result<Option<String>> {
        let url = format!("{}/browse?q={}", self.base_url, urlencoding::encode(title));
        debug!(url = %url, "Searching AnimeFLV");

        let html = self.fetch_page(&url).await?;
        let slug = parse_first_slug(&html);
        debug!(slug = ?slug, "Parsed AnimeFLV search page");
        Ok(slug)
    }

    async fn episode_streams(&self, slug: &str, episode: u32) -> Result<Vec<StreamCandidate>> {
        let url = format!("{}/ver/{}-{}", self.base_url, slug, episode);
        debug!(url = %url, "Fetching episode viewer page");

        let html = self.fetch_page(&url).await?;
        let candidates = parse_stream_candidates(&html);
        debug!(count = candidates.len(), "Parsed stream candidates");
        Ok(candidates)
    }
}

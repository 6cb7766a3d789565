use serde::{Deserialize, Serialize};

use crate::error::Result;

pub mod animeflv;

/// One playable video URL paired with the label of its hosting server
/// (e.g. "Mega"). The playback flow treats the first candidate as
/// authoritative; the source site imposes no ordering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamCandidate {
    pub server: String,
    pub url: String,
}

#[async_trait::async_trait]
pub trait StreamProvider {
    /// Stage 1: find the site's slug for a human-readable title.
    /// `Ok(None)` when the site has no matching entry.
    async fn locate(&self, title: &str) -> Result<Option<String>>;

    /// Stage 2: collect candidate stream links for one episode of a
    /// located anime, in document order.
    async fn episode_streams(&self, slug: &str, episode: u32) -> Result<Vec<StreamCandidate>>;

    /// Runs both stages. A title without a site counterpart short-circuits
    /// to an empty list; no episode page is fetched.
    async fn resolve(&self, title: &str, episode: u32) -> Result<Vec<StreamCandidate>> {
        match self.locate(title).await? {
            Some(slug) => self.episode_streams(&slug, episode).await,
            None => Ok(Vec::new()),
        }
    }
}

//! Song search across YouTube, Spotify and SoundCloud, normalized to [SongRecord]s.

mod duration;
mod platform;
mod recommend;
mod soundcloud;
mod spotify;
mod token;
mod youtube;

use std::time::Duration;

use async_trait::async_trait;
use cubebeat_core::{Platform, SongRecord};
use futures_util::{stream::FuturesUnordered, StreamExt};
use log::{debug, warn};
use reqwest::Client;
use thiserror::Error;

pub use duration::*;
pub use platform::*;
pub use recommend::*;
pub use soundcloud::*;
pub use spotify::*;
pub use token::*;
pub use youtube::*;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Failed to build HTTP client: {0}")]
    Client(String),

    #[error("Failed to fetch results: {0}")]
    FetchError(String),

    #[error("{platform} responded with status {status}")]
    Status { platform: Platform, status: u16 },

    #[error("Failed to parse results: {0}")]
    ParseError(String),

    #[error("Could not obtain an access token: {0}")]
    Token(String),

    #[error("{0} is not available")]
    Unavailable(Platform),
}

/// API credentials for each platform. A platform without credentials returns no results.
#[derive(Debug, Clone, Default)]
pub struct SearchCredentials {
    pub youtube_api_key: Option<String>,
    pub spotify: Option<ClientCredentials>,
    pub soundcloud_client_id: Option<String>,
}

/// Something the bot can resolve song requests with
#[async_trait]
pub trait SongSearch: Send + Sync {
    /// Searches every platform at once. Failing platforms contribute nothing.
    ///
    /// Results are in the order the platforms answered, which differs between runs.
    async fn search_all(&self, query: &str, limit: usize) -> Vec<SongRecord>;

    /// Searches a single platform
    async fn search_platform(
        &self,
        platform: Platform,
        query: &str,
        limit: usize,
    ) -> Result<Vec<SongRecord>, SearchError>;

    /// Songs to suggest to a user
    async fn recommend(&self, username: &str) -> Vec<SongRecord>;
}

/// Fans searches out to every configured platform
pub struct MusicSearch {
    platforms: Vec<Box<dyn SearchPlatform>>,
}

impl MusicSearch {
    /// Creates the adapter with the three built in platforms.
    /// Every request is bounded by `timeout`.
    pub fn new(credentials: SearchCredentials, timeout: Duration) -> Result<Self, SearchError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SearchError::Client(e.to_string()))?;

        Ok(Self::with_platforms(vec![
            Box::new(YouTubeSearch::new(&client, credentials.youtube_api_key)),
            Box::new(SpotifySearch::new(&client, credentials.spotify)),
            Box::new(SoundCloudSearch::new(
                &client,
                credentials.soundcloud_client_id,
            )),
        ]))
    }

    pub fn with_platforms(platforms: Vec<Box<dyn SearchPlatform>>) -> Self {
        Self { platforms }
    }

    /// The platforms that have credentials
    pub fn configured(&self) -> Vec<Platform> {
        self.platforms
            .iter()
            .filter(|p| p.is_configured())
            .map(|p| p.platform())
            .collect()
    }

    fn find(&self, platform: Platform) -> Option<&dyn SearchPlatform> {
        self.platforms
            .iter()
            .find(|p| p.platform() == platform)
            .map(|p| p.as_ref())
    }
}

async fn search_on(
    platform: &dyn SearchPlatform,
    query: &str,
    limit: usize,
) -> Result<Vec<SongRecord>, SearchError> {
    if !platform.is_configured() {
        warn!("{} credentials are not configured", platform.platform());
        return Ok(vec![]);
    }

    let results = platform.search(query, limit).await?;
    debug!(
        "{} returned {} results for {:?}",
        platform.platform(),
        results.len(),
        query
    );

    Ok(results)
}

#[async_trait]
impl SongSearch for MusicSearch {
    async fn search_all(&self, query: &str, limit: usize) -> Vec<SongRecord> {
        let per_platform = limit / 3 + 1;

        let mut pending: FuturesUnordered<_> = self
            .platforms
            .iter()
            .map(|platform| async move {
                let outcome = search_on(platform.as_ref(), query, per_platform).await;
                (platform.platform(), outcome)
            })
            .collect();

        let mut results = Vec::new();

        while let Some((platform, outcome)) = pending.next().await {
            match outcome {
                Ok(songs) => results.extend(songs),
                Err(e) => warn!("{} search failed: {}", platform, e),
            }
        }

        results.truncate(limit);
        results
    }

    async fn search_platform(
        &self,
        platform: Platform,
        query: &str,
        limit: usize,
    ) -> Result<Vec<SongRecord>, SearchError> {
        let searcher = self
            .find(platform)
            .ok_or(SearchError::Unavailable(platform))?;

        search_on(searcher, query, limit).await
    }

    async fn recommend(&self, _username: &str) -> Vec<SongRecord> {
        popular_songs()
    }
}

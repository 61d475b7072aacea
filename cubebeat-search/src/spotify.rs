use std::sync::Arc;

use async_trait::async_trait;
use cubebeat_core::{Platform, SongRecord};
use reqwest::Client;
use serde::Deserialize;

use crate::{fetch_json, millis_to_seconds, ClientCredentials, SearchError, SearchPlatform, TokenCache};

const SEARCH_URL: &str = "https://api.spotify.com/v1/search";

/// Searches Spotify's track catalog with an app token
pub struct SpotifySearch {
    client: Client,
    tokens: Option<Arc<TokenCache>>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    tracks: Tracks,
}

#[derive(Debug, Deserialize)]
struct Tracks {
    #[serde(default)]
    items: Vec<Track>,
}

#[derive(Debug, Deserialize)]
struct Track {
    id: String,
    name: String,
    #[serde(default)]
    artists: Vec<Artist>,
    duration_ms: u64,
    external_urls: ExternalUrls,
    album: Album,
}

#[derive(Debug, Deserialize)]
struct Artist {
    name: String,
}

#[derive(Debug, Deserialize)]
struct ExternalUrls {
    #[serde(default)]
    spotify: String,
}

#[derive(Debug, Deserialize)]
struct Album {
    #[serde(default)]
    images: Vec<Image>,
}

#[derive(Debug, Deserialize)]
struct Image {
    url: String,
}

impl SpotifySearch {
    pub fn new(client: &Client, credentials: Option<ClientCredentials>) -> Self {
        let tokens = credentials
            .filter(|c| !c.client_id.is_empty() && !c.client_secret.is_empty())
            .map(|c| Arc::new(TokenCache::new(client, c)));

        Self {
            client: client.clone(),
            tokens,
        }
    }
}

#[async_trait]
impl SearchPlatform for SpotifySearch {
    fn platform(&self) -> Platform {
        Platform::Spotify
    }

    fn is_configured(&self) -> bool {
        self.tokens.is_some()
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SongRecord>, SearchError> {
        let tokens = self
            .tokens
            .as_ref()
            .ok_or(SearchError::Unavailable(Platform::Spotify))?;

        let token = tokens.token().await?;
        let request = self
            .client
            .get(SEARCH_URL)
            .bearer_auth(token)
            .query(&[("q", query), ("type", "track"), ("limit", &limit.to_string())]);

        match fetch_json::<SearchResponse>(Platform::Spotify, request).await {
            Ok(response) => Ok(songs_from_search(response)),
            Err(e) => {
                // A rejected token is dropped so the next search fetches a new one
                if matches!(e, SearchError::Status { status: 401, .. }) {
                    tokens.invalidate();
                }

                Err(e)
            }
        }
    }
}

fn songs_from_search(response: SearchResponse) -> Vec<SongRecord> {
    response
        .tracks
        .items
        .into_iter()
        .map(|track| {
            let artist = track
                .artists
                .iter()
                .map(|a| a.name.as_str())
                .collect::<Vec<_>>()
                .join(", ");

            let thumbnail = track
                .album
                .images
                .get(1)
                .map(|i| i.url.clone())
                .unwrap_or_default();

            SongRecord {
                id: track.id,
                title: track.name,
                artist,
                duration_seconds: Some(millis_to_seconds(track.duration_ms)),
                platform: Platform::Spotify,
                url: track.external_urls.spotify,
                thumbnail,
            }
        })
        .collect()
}

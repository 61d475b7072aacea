use std::collections::HashMap;

use async_trait::async_trait;
use cubebeat_core::{Platform, SongRecord};
use log::warn;
use reqwest::Client;
use serde::Deserialize;

use crate::{fetch_json, parse_iso_duration, SearchError, SearchPlatform};

const SEARCH_URL: &str = "https://www.googleapis.com/youtube/v3/search";
const VIDEOS_URL: &str = "https://www.googleapis.com/youtube/v3/videos";
/// YouTube's category id for music
const MUSIC_CATEGORY: &str = "10";

/// Searches YouTube's music category through the Data API
pub struct YouTubeSearch {
    client: Client,
    api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    id: ResourceId,
    snippet: Snippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResourceId {
    video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Snippet {
    title: String,
    channel_title: String,
    #[serde(default)]
    thumbnails: HashMap<String, Thumbnail>,
}

#[derive(Debug, Deserialize)]
struct Thumbnail {
    url: String,
}

#[derive(Debug, Deserialize)]
struct VideosResponse {
    #[serde(default)]
    items: Vec<VideoItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoItem {
    id: String,
    content_details: ContentDetails,
}

#[derive(Debug, Deserialize)]
struct ContentDetails {
    duration: String,
}

impl YouTubeSearch {
    pub fn new(client: &Client, api_key: Option<String>) -> Self {
        Self {
            client: client.clone(),
            api_key: api_key.filter(|k| !k.is_empty()),
        }
    }

    /// Looks up the real length of each video, since search results don't include it
    async fn durations(&self, api_key: &str, ids: &[&str]) -> Result<HashMap<String, u32>, SearchError> {
        let request = self.client.get(VIDEOS_URL).query(&[
            ("part", "contentDetails"),
            ("id", &ids.join(",")),
            ("key", api_key),
        ]);

        let response: VideosResponse = fetch_json(Platform::YouTube, request).await?;
        Ok(durations_by_id(response))
    }
}

#[async_trait]
impl SearchPlatform for YouTubeSearch {
    fn platform(&self) -> Platform {
        Platform::YouTube
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SongRecord>, SearchError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(SearchError::Unavailable(Platform::YouTube))?;

        let request = self.client.get(SEARCH_URL).query(&[
            ("part", "snippet"),
            ("q", query),
            ("type", "video"),
            ("videoCategoryId", MUSIC_CATEGORY),
            ("maxResults", &limit.to_string()),
            ("key", api_key),
        ]);

        let response: SearchResponse = fetch_json(Platform::YouTube, request).await?;
        let mut songs = songs_from_search(response);

        if songs.is_empty() {
            return Ok(songs);
        }

        let ids: Vec<&str> = songs.iter().map(|s| s.id.as_str()).collect();

        match self.durations(api_key, &ids).await {
            Ok(durations) => {
                for song in &mut songs {
                    song.duration_seconds = durations.get(&song.id).copied();
                }
            }
            Err(e) => warn!("Could not look up YouTube durations: {}", e),
        }

        Ok(songs)
    }
}

fn songs_from_search(response: SearchResponse) -> Vec<SongRecord> {
    response
        .items
        .into_iter()
        .filter_map(|item| {
            let id = item.id.video_id?;
            let thumbnail = item
                .snippet
                .thumbnails
                .get("medium")
                .map(|t| t.url.clone())
                .unwrap_or_default();

            Some(SongRecord {
                url: format!("https://www.youtube.com/watch?v={}", id),
                title: item.snippet.title,
                artist: item.snippet.channel_title,
                duration_seconds: None,
                platform: Platform::YouTube,
                thumbnail,
                id,
            })
        })
        .collect()
}

fn durations_by_id(response: VideosResponse) -> HashMap<String, u32> {
    response
        .items
        .into_iter()
        .filter_map(|v| parse_iso_duration(&v.content_details.duration).map(|d| (v.id, d)))
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;

    const SEARCH_JSON: &str = r#"{
        "kind": "youtube#searchListResponse",
        "items": [
            {
                "id": { "kind": "youtube#video", "videoId": "4NRXx6U8ABQ" },
                "snippet": {
                    "title": "The Weeknd - Blinding Lights",
                    "channelTitle": "TheWeekndVEVO",
                    "thumbnails": {
                        "default": { "url": "https://i.ytimg.com/vi/4NRXx6U8ABQ/default.jpg" },
                        "medium": { "url": "https://i.ytimg.com/vi/4NRXx6U8ABQ/mqdefault.jpg" }
                    }
                }
            },
            {
                "id": { "kind": "youtube#channel", "channelId": "UC0WP5P-ufpRfjbNrmOWwLBQ" },
                "snippet": { "title": "The Weeknd", "channelTitle": "The Weeknd" }
            }
        ]
    }"#;

    const VIDEOS_JSON: &str = r#"{
        "items": [
            { "id": "4NRXx6U8ABQ", "contentDetails": { "duration": "PT4M22S" } },
            { "id": "broken", "contentDetails": { "duration": "P" } }
        ]
    }"#;

    #[test]
    fn test_search_normalization() {
        let response: SearchResponse = serde_json::from_str(SEARCH_JSON).unwrap();
        let songs = songs_from_search(response);

        assert_eq!(songs.len(), 1, "channels are skipped");

        let song = &songs[0];
        assert_eq!(song.id, "4NRXx6U8ABQ");
        assert_eq!(song.artist, "TheWeekndVEVO");
        assert_eq!(song.platform, Platform::YouTube);
        assert_eq!(song.url, "https://www.youtube.com/watch?v=4NRXx6U8ABQ");
        assert_eq!(song.thumbnail, "https://i.ytimg.com/vi/4NRXx6U8ABQ/mqdefault.jpg");
        assert_eq!(song.duration_seconds, None);
    }

    #[test]
    fn test_video_durations() {
        let response: VideosResponse = serde_json::from_str(VIDEOS_JSON).unwrap();
        let durations = durations_by_id(response);

        assert_eq!(durations.get("4NRXx6U8ABQ"), Some(&262));
        assert!(!durations.contains_key("broken"));
    }

    #[test]
    fn test_empty_key_is_unconfigured() {
        let client = Client::new();

        assert!(!YouTubeSearch::new(&client, Some(String::new())).is_configured());
        assert!(YouTubeSearch::new(&client, Some("key".to_string())).is_configured());
    }
}

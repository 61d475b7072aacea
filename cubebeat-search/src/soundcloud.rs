use async_trait::async_trait;
use cubebeat_core::{Platform, SongRecord};
use reqwest::Client;
use serde::Deserialize;

use crate::{fetch_json, millis_to_seconds, SearchError, SearchPlatform};

const TRACKS_URL: &str = "https://api.soundcloud.com/tracks";

/// Searches public SoundCloud tracks with an app client id
pub struct SoundCloudSearch {
    client: Client,
    client_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Track {
    id: u64,
    title: String,
    user: User,
    #[serde(default)]
    duration: u64,
    #[serde(default)]
    permalink_url: String,
    artwork_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct User {
    username: String,
}

impl SoundCloudSearch {
    pub fn new(client: &Client, client_id: Option<String>) -> Self {
        Self {
            client: client.clone(),
            client_id: client_id.filter(|c| !c.is_empty()),
        }
    }
}

#[async_trait]
impl SearchPlatform for SoundCloudSearch {
    fn platform(&self) -> Platform {
        Platform::SoundCloud
    }

    fn is_configured(&self) -> bool {
        self.client_id.is_some()
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SongRecord>, SearchError> {
        let client_id = self
            .client_id
            .as_deref()
            .ok_or(SearchError::Unavailable(Platform::SoundCloud))?;

        let request = self.client.get(TRACKS_URL).query(&[
            ("q", query),
            ("client_id", client_id),
            ("limit", &limit.to_string()),
        ]);

        let tracks: Vec<Track> = fetch_json(Platform::SoundCloud, request).await?;
        Ok(tracks.into_iter().map(Track::into_song).collect())
    }
}

impl Track {
    fn into_song(self) -> SongRecord {
        SongRecord {
            id: self.id.to_string(),
            title: self.title,
            artist: self.user.username,
            duration_seconds: Some(millis_to_seconds(self.duration)),
            platform: Platform::SoundCloud,
            url: self.permalink_url,
            thumbnail: self.artwork_url.unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const TRACKS_JSON: &str = r#"[
        {
            "id": 1033187548,
            "title": "Levitating",
            "user": { "username": "dualipa" },
            "duration": 203064,
            "permalink_url": "https://soundcloud.com/dualipa/levitating",
            "artwork_url": "https://i1.sndcdn.com/artworks-large.jpg"
        },
        {
            "id": 42,
            "title": "Untitled",
            "user": { "username": "someone" },
            "duration": 61500,
            "permalink_url": "https://soundcloud.com/someone/untitled",
            "artwork_url": null
        }
    ]"#;

    #[test]
    fn test_track_normalization() {
        let tracks: Vec<Track> = serde_json::from_str(TRACKS_JSON).unwrap();
        let songs: Vec<_> = tracks.into_iter().map(Track::into_song).collect();

        assert_eq!(songs[0].id, "1033187548");
        assert_eq!(songs[0].artist, "dualipa");
        assert_eq!(songs[0].duration_seconds, Some(203));
        assert_eq!(songs[0].platform, Platform::SoundCloud);

        assert_eq!(songs[1].duration_seconds, Some(61));
        assert_eq!(songs[1].thumbnail, "");
    }
}

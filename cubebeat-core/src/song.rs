use std::{fmt::Display, str::FromStr, time::Duration};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A music service songs can be resolved from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Platform {
    YouTube,
    Spotify,
    SoundCloud,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown platform: {0}")]
pub struct UnknownPlatform(pub String);

impl Platform {
    pub const ALL: [Platform; 3] = [Platform::YouTube, Platform::Spotify, Platform::SoundCloud];

    /// The display name, as shown in chat
    pub fn name(&self) -> &'static str {
        match self {
            Platform::YouTube => "YouTube",
            Platform::Spotify => "Spotify",
            Platform::SoundCloud => "SoundCloud",
        }
    }
}

impl Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Platform {
    type Err = UnknownPlatform;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "youtube" => Ok(Platform::YouTube),
            "spotify" => Ok(Platform::Spotify),
            "soundcloud" => Ok(Platform::SoundCloud),
            other => Err(UnknownPlatform(other.to_string())),
        }
    }
}

/// A song as returned by any platform, normalized to a common shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SongRecord {
    pub id: String,
    pub title: String,
    pub artist: String,
    /// Length of the song in whole seconds, if the platform reported it
    pub duration_seconds: Option<u32>,
    pub platform: Platform,
    pub url: String,
    pub thumbnail: String,
}

impl SongRecord {
    /// How long the song plays for, using `fallback` when the length is unknown.
    pub fn play_duration(&self, fallback: Duration) -> Duration {
        self.duration_seconds
            .filter(|s| *s > 0)
            .map(|s| Duration::from_secs(s as u64))
            .unwrap_or(fallback)
    }
}

#[cfg(test)]
impl SongRecord {
    pub fn mock(title: &str) -> Self {
        Self {
            id: title.to_lowercase(),
            title: title.to_string(),
            artist: "Someone".to_string(),
            duration_seconds: Some(200),
            platform: Platform::YouTube,
            url: format!("https://www.youtube.com/watch?v={}", title.to_lowercase()),
            thumbnail: String::new(),
        }
    }
}

use std::time::Duration;

use log::warn;
use serde::Deserialize;
use thiserror::Error;

use crate::Platform;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Bot configuration is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

/// The configuration of a room's bot, supplied as a JSON blob.
/// Every key is optional.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BotConfig {
    /// Sent to chat when the bot comes online
    pub welcome_message: String,
    /// How many songs can wait in the queue
    pub max_queue_size: usize,
    /// What a regular user pays to request a song
    pub song_cost: u64,
    pub enable_competitions: bool,
    /// Either "all" or the name of a single platform to search
    pub platform_preference: String,
    /// The bot's own username, tips to anyone else are ignored
    pub bot_username: String,
    /// Users with full control over the bot
    pub owners: Vec<String>,
    /// Cubes granted per daily claim, also the starting balance of new users
    pub daily_reward: u64,
    /// Cubes paid to the competition winner
    pub competition_prize: u64,
    /// How long a song plays when its length is unknown
    pub default_song_seconds: u64,
    /// Seconds between dance moves
    pub dance_interval_seconds: u64,
    /// Upper bound for every request to a music platform
    pub request_timeout_seconds: u64,
}

impl BotConfig {
    /// Parses the JSON configuration blob
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// The platform play requests are restricted to, or [None] to search all of them
    pub fn preferred_platform(&self) -> Option<Platform> {
        if self.platform_preference.eq_ignore_ascii_case("all") {
            return None;
        }

        match self.platform_preference.parse() {
            Ok(platform) => Some(platform),
            Err(e) => {
                warn!("{}, searching all platforms instead", e);
                None
            }
        }
    }

    pub fn default_song_duration(&self) -> Duration {
        Duration::from_secs(self.default_song_seconds)
    }

    pub fn dance_interval(&self) -> Duration {
        Duration::from_secs(self.dance_interval_seconds.max(1))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            welcome_message: "🎵 Welcome! Use cubes to request songs!".to_string(),
            max_queue_size: 50,
            song_cost: 10,
            enable_competitions: true,
            platform_preference: "all".to_string(),
            bot_username: "musicbot".to_string(),
            owners: vec!["OLD_SINNER_".to_string(), "admin".to_string()],
            daily_reward: 50,
            competition_prize: 100,
            // Most songs are around three minutes long
            default_song_seconds: 180,
            dance_interval_seconds: 3,
            request_timeout_seconds: 10,
        }
    }
}

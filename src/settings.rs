use std::{env, path::PathBuf};

use cubebeat_core::BotConfig;
use cubebeat_search::{ClientCredentials, SearchCredentials};
use log::warn;

use crate::StartupError;

const DEFAULT_LEDGER_PATH: &str = "cube_data.json";
const DEFAULT_VIP_PATH: &str = "vip_grants.json";

/// Everything the process reads from its environment
pub struct Settings {
    pub room_id: String,
    pub api_token: String,
    pub config: BotConfig,
    pub credentials: SearchCredentials,
    pub ledger_path: PathBuf,
    pub vip_path: PathBuf,
}

impl Settings {
    pub fn from_env() -> Result<Self, StartupError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, StartupError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let required = |name: &'static str| var(name).ok_or(StartupError::MissingVariable(name));

        let config = match var("BOT_CONFIG") {
            Some(json) => BotConfig::from_json(&json).unwrap_or_else(|e| {
                warn!("BOT_CONFIG is invalid, using defaults: {}", e);
                BotConfig::default()
            }),
            None => BotConfig::default(),
        };

        let spotify = match (var("SPOTIFY_CLIENT_ID"), var("SPOTIFY_CLIENT_SECRET")) {
            (Some(client_id), Some(client_secret)) => Some(ClientCredentials {
                client_id,
                client_secret,
            }),
            _ => None,
        };

        Ok(Self {
            room_id: required("HIGHRISE_ROOM_ID")?,
            api_token: required("HIGHRISE_API_TOKEN")?,
            config,
            credentials: SearchCredentials {
                youtube_api_key: var("YOUTUBE_API_KEY"),
                spotify,
                soundcloud_client_id: var("SOUNDCLOUD_CLIENT_ID"),
            },
            ledger_path: var("CUBEBEAT_LEDGER_PATH")
                .unwrap_or_else(|| DEFAULT_LEDGER_PATH.to_string())
                .into(),
            vip_path: var("CUBEBEAT_VIP_PATH")
                .unwrap_or_else(|| DEFAULT_VIP_PATH.to_string())
                .into(),
        })
    }

    /// The last few characters of the API token, for logs
    pub fn token_hint(&self) -> String {
        let chars: Vec<char> = self.api_token.chars().collect();
        let tail: String = chars[chars.len().saturating_sub(4)..].iter().collect();

        format!("...{}", tail)
    }
}

use async_trait::async_trait;
use cubebeat_core::{Platform, SongRecord};
use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;

use crate::SearchError;

/// A music service that can be searched for songs
#[async_trait]
pub trait SearchPlatform: Send + Sync {
    /// Which platform this is
    fn platform(&self) -> Platform;

    /// Returns true if the credentials needed to search are present
    fn is_configured(&self) -> bool;

    /// Searches for at most `limit` songs matching the query
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SongRecord>, SearchError>;
}

/// Sends a request and decodes a successful JSON response
pub(crate) async fn fetch_json<T>(platform: Platform, request: RequestBuilder) -> Result<T, SearchError>
where
    T: DeserializeOwned,
{
    let response = request
        .send()
        .await
        .map_err(|e| SearchError::FetchError(e.to_string()))?;

    decode_json(platform, response).await
}

async fn decode_json<T>(platform: Platform, response: Response) -> Result<T, SearchError>
where
    T: DeserializeOwned,
{
    let status = response.status();

    if !status.is_success() {
        return Err(SearchError::Status {
            platform,
            status: status.as_u16(),
        });
    }

    response
        .json()
        .await
        .map_err(|e| SearchError::ParseError(e.to_string()))
}

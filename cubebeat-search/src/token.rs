use std::{
    sync::{Arc, Weak},
    time::Duration,
};

use async_trait::async_trait;
use log::{debug, warn};
use parking_lot::{Mutex, RwLock};
use reqwest::Client;
use serde::Deserialize;
use tokio::{
    task::JoinHandle,
    time::{sleep_until, Instant},
};

use crate::SearchError;

const TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
/// Tokens are renewed this long before they actually expire
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);
/// How long to wait before retrying a failed renewal. Renewals are never closer together than this.
const RETRY_DELAY: Duration = Duration::from_secs(30);

/// An application's client id and secret, for the client-credentials grant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientCredentials {
    pub client_id: String,
    pub client_secret: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: u64,
}

/// Where access tokens come from
#[async_trait]
pub(crate) trait TokenSource: Send + Sync {
    async fn fetch(&self) -> Result<TokenResponse, SearchError>;
}

/// Spotify's accounts service, using the client-credentials grant
struct SpotifyAccounts {
    client: Client,
    credentials: ClientCredentials,
}

#[async_trait]
impl TokenSource for SpotifyAccounts {
    async fn fetch(&self) -> Result<TokenResponse, SearchError> {
        let response = self
            .client
            .post(TOKEN_URL)
            .basic_auth(
                &self.credentials.client_id,
                Some(&self.credentials.client_secret),
            )
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(|e| SearchError::Token(e.to_string()))?;

        if !response.status().is_success() {
            return Err(SearchError::Token(format!(
                "token endpoint responded with status {}",
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| SearchError::Token(e.to_string()))
    }
}

fn default_expires_in() -> u64 {
    3600
}

#[derive(Debug, Clone)]
struct AccessToken {
    value: String,
    renew_at: Instant,
}

impl AccessToken {
    fn from_response(response: TokenResponse, now: Instant) -> Self {
        let lifetime = Duration::from_secs(response.expires_in).saturating_sub(EXPIRY_MARGIN);

        Self {
            value: response.access_token,
            renew_at: now + lifetime,
        }
    }

    fn is_fresh(&self, now: Instant) -> bool {
        now < self.renew_at
    }
}

/// Holds an access token and keeps it renewed in the background.
///
/// The first call to [TokenCache::token] fetches a token and starts the renewal task,
/// which replaces the token shortly before it expires. The task stops when the cache is dropped.
pub struct TokenCache {
    source: Box<dyn TokenSource>,
    token: RwLock<Option<AccessToken>>,
    fetching: tokio::sync::Mutex<()>,
    renewal: Mutex<Option<JoinHandle<()>>>,
}

impl TokenCache {
    pub fn new(client: &Client, credentials: ClientCredentials) -> Self {
        Self::with_source(SpotifyAccounts {
            client: client.clone(),
            credentials,
        })
    }

    pub(crate) fn with_source(source: impl TokenSource + 'static) -> Self {
        Self {
            source: Box::new(source),
            token: Default::default(),
            fetching: Default::default(),
            renewal: Default::default(),
        }
    }

    /// Returns a valid access token, fetching one if none is cached
    pub async fn token(self: &Arc<Self>) -> Result<String, SearchError> {
        if let Some(value) = self.cached() {
            return Ok(value);
        }

        let _fetching = self.fetching.lock().await;

        // Someone else may have fetched while we waited
        if let Some(value) = self.cached() {
            return Ok(value);
        }

        let value = self.store(self.source.fetch().await?);
        self.start_renewal();

        Ok(value)
    }

    /// Forgets the current token, so the next call fetches a new one
    pub fn invalidate(&self) {
        *self.token.write() = None;
    }

    fn cached(&self) -> Option<String> {
        self.token
            .read()
            .as_ref()
            .filter(|t| t.is_fresh(Instant::now()))
            .map(|t| t.value.clone())
    }

    fn renew_at(&self) -> Instant {
        self.token
            .read()
            .as_ref()
            .map(|t| t.renew_at)
            .unwrap_or_else(Instant::now)
    }

    fn store(&self, response: TokenResponse) -> String {
        let token = AccessToken::from_response(response, Instant::now());
        let value = token.value.clone();

        *self.token.write() = Some(token);
        debug!("Obtained a new Spotify access token");

        value
    }

    fn start_renewal(self: &Arc<Self>) {
        let mut renewal = self.renewal.lock();

        if renewal.as_ref().is_some_and(|h| !h.is_finished()) {
            return;
        }

        let cache = Arc::downgrade(self);
        *renewal = Some(tokio::spawn(renew_forever(cache)));
    }

    async fn renew(&self) -> Result<Instant, SearchError> {
        let _fetching = self.fetching.lock().await;

        self.store(self.source.fetch().await?);
        Ok(self.renew_at())
    }
}

impl Drop for TokenCache {
    fn drop(&mut self) {
        if let Some(handle) = self.renewal.lock().take() {
            handle.abort();
        }
    }
}

fn next_renewal(renew_at: Instant) -> Instant {
    renew_at.max(Instant::now() + RETRY_DELAY)
}

/// Only holds a strong reference while renewing, so dropping the cache ends the loop
async fn renew_forever(cache: Weak<TokenCache>) {
    let mut deadline = match cache.upgrade() {
        Some(cache) => next_renewal(cache.renew_at()),
        None => return,
    };

    loop {
        sleep_until(deadline).await;

        let Some(cache) = cache.upgrade() else {
            return;
        };

        deadline = match cache.renew().await {
            Ok(renew_at) => next_renewal(renew_at),
            Err(e) => {
                warn!("Failed to renew Spotify access token: {}", e);
                Instant::now() + RETRY_DELAY
            }
        };
    }
}

#[cfg(test)]
mod test {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use tokio::time::advance;

    use super::*;

    struct CountingSource {
        fetches: Arc<AtomicUsize>,
        expires_in: u64,
    }

    #[async_trait]
    impl TokenSource for CountingSource {
        async fn fetch(&self) -> Result<TokenResponse, SearchError> {
            let count = self.fetches.fetch_add(1, Ordering::SeqCst) + 1;

            Ok(TokenResponse {
                access_token: format!("token-{}", count),
                expires_in: self.expires_in,
            })
        }
    }

    fn counting_cache(expires_in: u64) -> (Arc<TokenCache>, Arc<AtomicUsize>) {
        let fetches = Arc::new(AtomicUsize::new(0));
        let cache = TokenCache::with_source(CountingSource {
            fetches: fetches.clone(),
            expires_in,
        });

        (Arc::new(cache), fetches)
    }

    /// Lets the renewal task run up to its next sleep
    async fn settle() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    fn credentials() -> ClientCredentials {
        ClientCredentials {
            client_id: "id".to_string(),
            client_secret: "secret".to_string(),
        }
    }

    fn response(expires_in: u64) -> TokenResponse {
        TokenResponse {
            access_token: "abc".to_string(),
            expires_in,
        }
    }

    #[test]
    fn test_token_response_defaults() {
        let response: TokenResponse =
            serde_json::from_str(r#"{ "access_token": "abc", "token_type": "Bearer" }"#).unwrap();

        assert_eq!(response.access_token, "abc");
        assert_eq!(response.expires_in, 3600);
    }

    #[tokio::test(start_paused = true)]
    async fn test_token_goes_stale_before_expiry() {
        let now = Instant::now();
        let token = AccessToken::from_response(response(3600), now);

        assert!(token.is_fresh(now + Duration::from_secs(3539)));
        assert!(!token.is_fresh(now + Duration::from_secs(3540)));
        assert!(!AccessToken::from_response(response(30), now).is_fresh(now));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cached_token_is_reused() {
        let cache = Arc::new(TokenCache::new(&Client::new(), credentials()));
        cache.store(response(3600));

        assert_eq!(cache.token().await.unwrap(), "abc");

        tokio::time::advance(Duration::from_secs(3600)).await;
        assert_eq!(cache.cached(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalidate_forgets_token() {
        let cache = TokenCache::new(&Client::new(), credentials());
        cache.store(response(3600));
        cache.invalidate();

        assert_eq!(cache.cached(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_token_is_renewed_before_expiry() {
        let (cache, fetches) = counting_cache(3600);

        assert_eq!(cache.token().await.unwrap(), "token-1");
        settle().await;

        advance(Duration::from_secs(3539)).await;
        settle().await;
        assert_eq!(fetches.load(Ordering::SeqCst), 1);

        advance(Duration::from_secs(2)).await;
        settle().await;
        assert_eq!(fetches.load(Ordering::SeqCst), 2);
        assert_eq!(cache.token().await.unwrap(), "token-2");
        assert_eq!(fetches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_short_lived_tokens_are_not_renewed_in_a_loop() {
        let (cache, fetches) = counting_cache(10);

        cache.token().await.unwrap();
        settle().await;
        assert_eq!(fetches.load(Ordering::SeqCst), 1);

        advance(Duration::from_secs(29)).await;
        settle().await;
        assert_eq!(fetches.load(Ordering::SeqCst), 1);

        advance(Duration::from_secs(2)).await;
        settle().await;
        assert_eq!(fetches.load(Ordering::SeqCst), 2);

        advance(Duration::from_secs(29)).await;
        settle().await;
        assert_eq!(fetches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_renewal_stops_when_cache_is_dropped() {
        let (cache, fetches) = counting_cache(3600);

        cache.token().await.unwrap();
        settle().await;
        drop(cache);

        advance(Duration::from_secs(4 * 3600)).await;
        settle().await;
        assert_eq!(fetches.load(Ordering::SeqCst), 1);
    }
}

//! # Spotify Integration Module
//!
//! Thin client for the parts of the Spotify Web API the curator needs.
//!
//! ```text
//! Curation Layer (Resolver, FillLoop, PlaylistWriter)
//!          ↓  CatalogSearch / PlaylistStore
//! SpotifyClient
//!     ├── Authentication (OAuth 2.0 authorization code + PKCE)
//!     ├── Search (track search, one hit per query)
//!     ├── Playlists (create, page through items, add items)
//!     └── User (current profile)
//!          ↓
//! HTTP Layer (reqwest, JSON)
//! ```
//!
//! ## API Coverage
//!
//! - `GET /search` - Track search with market filter
//! - `GET /me` - Current user, owner of created playlists
//! - `POST /users/{user_id}/playlists` - Create new playlists
//! - `GET /playlists/{playlist_id}/tracks` - Paged playlist items
//! - `POST /playlists/{playlist_id}/tracks` - Add up to 100 tracks
//! - `POST /api/token` - Token exchange and refresh
//!
//! ## Rate Limiting
//!
//! Every call goes through [`SpotifyClient::send`]. A 429 response is retried
//! once after the `Retry-After` delay when that delay is at most 120 seconds.
//! A 502 Bad Gateway is retried up to three times with a 10 second pause.
//! Other failures come back as [`SpotifyError`].

use std::{fmt, time::Duration};

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use tokio::{sync::Mutex, time::sleep};

use crate::{
    config::{OAuthSettings, Settings},
    info,
    management::TokenManager,
    success,
    types::ApiErrorBody,
    warning,
};

pub mod auth;
pub mod playlist;
pub mod search;
pub mod user;

const MAX_RETRY_AFTER_SECS: u64 = 120;
const MAX_GATEWAY_RETRIES: u32 = 3;

#[derive(Debug)]
pub enum SpotifyError {
    Request(reqwest::Error),
    Api { status: u16, message: String },
    RateLimited(u64),
}

impl fmt::Display for SpotifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpotifyError::Request(e) => write!(f, "request failed: {}", e),
            SpotifyError::Api { status, message } => {
                write!(f, "Spotify API error {}: {}", status, message)
            }
            SpotifyError::RateLimited(secs) => write!(
                f,
                "rate limited for {} seconds, try again later",
                secs
            ),
        }
    }
}

impl std::error::Error for SpotifyError {}

impl From<reqwest::Error> for SpotifyError {
    fn from(err: reqwest::Error) -> Self {
        SpotifyError::Request(err)
    }
}

/// Authenticated Spotify client, built once per process run.
pub struct SpotifyClient {
    http: Client,
    api_url: String,
    market: String,
    oauth: OAuthSettings,
    tokens: Mutex<TokenManager>,
}

impl SpotifyClient {
    pub fn new(settings: &Settings, tokens: TokenManager) -> Self {
        Self {
            http: Client::new(),
            api_url: settings.spotify_api_url.clone(),
            market: settings.market.clone(),
            oauth: settings.oauth.clone(),
            tokens: Mutex::new(tokens),
        }
    }

    /// Builds a client from the cached token, running the browser
    /// authorization flow first when no token is cached.
    pub async fn connect(settings: &Settings) -> Result<Self, auth::AuthError> {
        let tokens = match TokenManager::load().await {
            Ok(tokens) => tokens,
            Err(_) => {
                info!("No Spotify token cached, starting authorization...");
                let token = auth::authorize(&settings.oauth).await?;
                let tokens = TokenManager::new(token);
                if let Err(e) = tokens.persist().await {
                    warning!("Failed to save token to cache: {}", e);
                }
                success!("Authentication successful!");
                tokens
            }
        };

        Ok(Self::new(settings, tokens))
    }

    pub fn market(&self) -> &str {
        &self.market
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }

    /// Sends an authorized request, retrying on rate limits and bad gateways.
    async fn send<F>(&self, build: F) -> Result<Response, SpotifyError>
    where
        F: Fn(&Client) -> RequestBuilder,
    {
        let mut gateway_retries = 0;
        let mut rate_limited = false;

        loop {
            let token = self.tokens.lock().await.get_valid_token(&self.oauth).await;
            let response = build(&self.http).bearer_auth(token).send().await?;
            let status = response.status();

            if status.is_success() {
                return Ok(response);
            }

            if status == StatusCode::TOO_MANY_REQUESTS {
                let retry_after = response
                    .headers()
                    .get("retry-after")
                    .and_then(|value| value.to_str().ok())
                    .and_then(|value| value.parse::<u64>().ok())
                    .unwrap_or(1);

                if rate_limited || retry_after > MAX_RETRY_AFTER_SECS {
                    return Err(SpotifyError::RateLimited(retry_after));
                }
                warning!("Rate limited by Spotify, retrying in {} seconds", retry_after);
                sleep(Duration::from_secs(retry_after)).await;
                rate_limited = true;
                continue;
            }

            if status == StatusCode::BAD_GATEWAY && gateway_retries < MAX_GATEWAY_RETRIES {
                gateway_retries += 1;
                sleep(Duration::from_secs(10)).await;
                continue; // retry
            }

            let message = match response.json::<ApiErrorBody>().await {
                Ok(body) => body.error.message,
                Err(_) => status
                    .canonical_reason()
                    .unwrap_or("unknown error")
                    .to_string(),
            };
            return Err(SpotifyError::Api {
                status: status.as_u16(),
                message,
            });
        }
    }
}

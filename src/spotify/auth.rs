use std::{fmt, sync::Arc, time::Duration};

use chrono::Utc;
use reqwest::{Client, Url};
use serde::Deserialize;
use tokio::sync::Mutex;

use crate::{
    config::OAuthSettings,
    server::start_api_server,
    types::{PkceToken, Token},
    utils, warning,
};

/// How long the flow waits for the browser callback.
const CALLBACK_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug)]
pub enum AuthError {
    Request(reqwest::Error),
    InvalidUrl(String),
    Timeout,
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::Request(e) => write!(f, "token request failed: {}", e),
            AuthError::InvalidUrl(e) => write!(f, "invalid authorization URL: {}", e),
            AuthError::Timeout => write!(f, "authentication failed or timed out"),
        }
    }
}

impl std::error::Error for AuthError {}

impl From<reqwest::Error> for AuthError {
    fn from(err: reqwest::Error) -> Self {
        AuthError::Request(err)
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: Option<String>,
    scope: Option<String>,
    expires_in: u64,
}

impl TokenResponse {
    fn into_token(self, previous_refresh: &str) -> Token {
        Token {
            access_token: self.access_token,
            refresh_token: self
                .refresh_token
                .unwrap_or_else(|| previous_refresh.to_string()),
            scope: self.scope.unwrap_or_default(),
            expires_in: self.expires_in,
            obtained_at: Utc::now().timestamp() as u64,
        }
    }
}

/// Runs the OAuth 2.0 authorization code flow with PKCE.
///
/// 1. Generates a code verifier and its SHA256 challenge
/// 2. Starts the local callback server on the configured address
/// 3. Opens the authorization URL in the default browser
/// 4. Waits for the callback to exchange the code for a token
///
/// The callback server is stopped before returning.
pub async fn authorize(oauth: &OAuthSettings) -> Result<Token, AuthError> {
    let code_verifier = utils::generate_code_verifier();
    let code_challenge = utils::generate_code_challenge(&code_verifier);

    let shared_state: Arc<Mutex<Option<PkceToken>>> = Arc::new(Mutex::new(Some(PkceToken {
        code_verifier,
        token: None,
    })));

    let server_state = Arc::clone(&shared_state);
    let server_oauth = oauth.clone();
    let server = tokio::spawn(async move {
        if let Err(e) = start_api_server(server_state, server_oauth).await {
            warning!("Callback server stopped: {}", e);
        }
    });

    let auth_url = authorize_url(oauth, &code_challenge)?;
    if webbrowser::open(auth_url.as_str()).is_err() {
        warning!(
            "Failed to open browser. Please navigate to the following URL manually:\n{}",
            auth_url
        )
    }

    let token = wait_for_token(shared_state).await;
    server.abort();

    token.ok_or(AuthError::Timeout)
}

/// Builds the authorization URL with properly encoded query parameters.
pub fn authorize_url(oauth: &OAuthSettings, code_challenge: &str) -> Result<Url, AuthError> {
    Url::parse_with_params(
        &oauth.auth_url,
        &[
            ("client_id", oauth.client_id.as_str()),
            ("response_type", "code"),
            ("redirect_uri", oauth.redirect_uri.as_str()),
            ("code_challenge", code_challenge),
            ("code_challenge_method", "S256"),
            ("scope", oauth.scope.as_str()),
        ],
    )
    .map_err(|e| AuthError::InvalidUrl(e.to_string()))
}

async fn wait_for_token(shared_state: Arc<Mutex<Option<PkceToken>>>) -> Option<Token> {
    use std::time::Instant;

    let start = Instant::now();

    while start.elapsed() < CALLBACK_TIMEOUT {
        let lock = shared_state.lock().await;
        if let Some(token) = lock.as_ref().and_then(|pkce| pkce.token.as_ref()) {
            return Some(token.clone());
        }
        drop(lock);
        tokio::time::sleep(Duration::from_secs(1)).await;
    }

    None
}

/// Exchanges a refresh token for a new access token.
///
/// Spotify may omit the refresh token in the response, in which case the
/// previous one stays valid and is kept.
pub async fn refresh_token(oauth: &OAuthSettings, refresh_token: &str) -> Result<Token, AuthError> {
    let client = Client::new();
    let response = client
        .post(&oauth.token_url)
        .basic_auth(&oauth.client_id, Some(&oauth.client_secret))
        .form(&[
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
        ])
        .send()
        .await?
        .error_for_status()?;

    let json: TokenResponse = response.json().await?;
    Ok(json.into_token(refresh_token))
}

/// Exchanges an authorization code for an access token.
///
/// The code verifier proves that the client finishing the flow is the one
/// that started it; the client secret authenticates the application.
pub async fn exchange_code_pkce(
    oauth: &OAuthSettings,
    code: &str,
    verifier: &str,
) -> Result<Token, AuthError> {
    let client = Client::new();
    let response = client
        .post(&oauth.token_url)
        .basic_auth(&oauth.client_id, Some(&oauth.client_secret))
        .form(&[
            ("grant_type", "authorization_code"),
            ("code", code),
            ("code_verifier", verifier),
            ("redirect_uri", oauth.redirect_uri.as_str()),
        ])
        .send()
        .await?
        .error_for_status()?;

    let json: TokenResponse = response.json().await?;
    Ok(json.into_token(""))
}

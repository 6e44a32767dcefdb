use axum::{Extension, Router, routing::get};
use std::{net::SocketAddr, str::FromStr, sync::Arc};
use tokio::sync::Mutex;

use crate::{api, config::OAuthSettings, types::PkceToken};

/// Routes of the callback server. The PKCE state and the OAuth settings are
/// shared with the handlers as extensions.
pub fn router(state: Arc<Mutex<Option<PkceToken>>>, oauth: OAuthSettings) -> Router {
    Router::new()
        .route("/health", get(api::health))
        .route("/callback", get(api::callback))
        .layer(Extension(state))
        .layer(Extension(oauth))
}

/// Serves `/callback` and `/health` until the task is aborted.
pub async fn start_api_server(
    state: Arc<Mutex<Option<PkceToken>>>,
    oauth: OAuthSettings,
) -> Result<(), String> {
    let addr = SocketAddr::from_str(&oauth.server_addr)
        .map_err(|e| format!("Failed to parse server address {}: {}", oauth.server_addr, e))?;

    let app = router(state, oauth);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| format!("Failed to bind {}: {}", addr, e))?;
    axum::serve(listener, app).await.map_err(|e| e.to_string())
}

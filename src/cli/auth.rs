use crate::{config::Settings, error, management::TokenManager, spotify, success};

/// Runs the browser authorization flow and caches the resulting token.
pub async fn auth(settings: &Settings) {
    match spotify::auth::authorize(&settings.oauth).await {
        Ok(token) => {
            let token_manager = TokenManager::new(token);
            if let Err(e) = token_manager.persist().await {
                error!("Failed to save token to cache: {}", e);
            }

            success!(
                "Authentication successful! Granted scope: {}",
                token_manager.current_token().scope
            );
        }
        Err(e) => error!("{}", e),
    }
}

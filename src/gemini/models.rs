use crate::types::{ListModelsResponse, ModelInfo};

use super::GeminiClient;

impl GeminiClient {
    /// Lists every model visible to the API key, following `nextPageToken`.
    pub async fn list_models(&self) -> Result<Vec<ModelInfo>, reqwest::Error> {
        let url = format!("{}/models", self.settings.api_url);
        let mut models = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self
                .http
                .get(&url)
                .header("x-goog-api-key", &self.settings.api_key)
                .query(&[("pageSize", "100")]);
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token.as_str())]);
            }

            let page = request
                .send()
                .await?
                .error_for_status()?
                .json::<ListModelsResponse>()
                .await?;
            models.extend(page.models);

            page_token = page.next_page_token.filter(|token| !token.is_empty());
            if page_token.is_none() {
                break;
            }
        }

        Ok(models)
    }
}

/// Keeps models whose id mentions gemini (drops PaLM-era and other families).
pub fn gemini_only(models: Vec<ModelInfo>) -> Vec<ModelInfo> {
    models
        .into_iter()
        .filter(|model| model.name.to_lowercase().contains("gemini"))
        .collect()
}

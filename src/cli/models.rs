use tabled::Table;

use crate::{
    config::Settings,
    gemini::{GeminiClient, models::gemini_only},
    info,
    types::ModelTableRow,
    warning,
};

/// Prints the Gemini models available to the configured API key.
pub async fn models(settings: &Settings) {
    let client = GeminiClient::new(settings.gemini.clone());

    let models = match client.list_models().await {
        Ok(models) => gemini_only(models),
        Err(e) => {
            warning!("Failed to list models: {}", e);
            return;
        }
    };

    if models.is_empty() {
        info!("No Gemini models available for this API key.");
        return;
    }

    let rows: Vec<ModelTableRow> = models
        .into_iter()
        .map(|model| ModelTableRow {
            name: model.display_name.unwrap_or_default(),
            id: model.name,
            methods: model.supported_generation_methods.join(","),
        })
        .collect();

    info!("Configured model: {}", client.model());
    println!("{}", Table::new(rows));
}

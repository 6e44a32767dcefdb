//! # Gemini Integration Module
//!
//! REST client for the Gemini `generateContent` and `models` endpoints.
//! [`GeminiClient`] implements [`Curator`]: it renders the curation prompt,
//! asks for a JSON response and turns the text into candidates. Every failure
//! comes back as a [`CurationError`] so the fill loop can count it against
//! its retry budget.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use reqwest::Client;

use crate::{
    config::GeminiSettings,
    curation::{Candidate, CurationError, CurationRequest, Curator, build_prompt, parse_candidates},
    info,
    types::{
        Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig, Part,
        SafetySetting,
    },
};

pub mod models;

const HARM_CATEGORIES: [&str; 4] = [
    "HARM_CATEGORY_HATE_SPEECH",
    "HARM_CATEGORY_DANGEROUS_CONTENT",
    "HARM_CATEGORY_HARASSMENT",
    "HARM_CATEGORY_SEXUALLY_EXPLICIT",
];

const BLOCKING_FINISH_REASONS: [&str; 4] = ["SAFETY", "PROHIBITED_CONTENT", "BLOCKLIST", "SPII"];

/// Gemini client, built once per process run.
pub struct GeminiClient {
    http: Client,
    settings: GeminiSettings,
}

impl GeminiClient {
    pub fn new(settings: GeminiSettings) -> Self {
        Self {
            http: Client::new(),
            settings,
        }
    }

    pub fn model(&self) -> &str {
        &self.settings.model
    }

    /// Sends one prompt and returns the response text.
    pub async fn generate(&self, prompt: &str) -> Result<String, CurationError> {
        let url = format!(
            "{}/models/{}:generateContent",
            self.settings.api_url,
            self.settings.model.trim_start_matches("models/")
        );

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.settings.api_key)
            .json(&generate_request(prompt))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CurationError::Transport(format!(
                "{} {}",
                status,
                body.chars().take(200).collect::<String>()
            )));
        }

        let body = response.json::<GenerateContentResponse>().await?;
        response_text(body)
    }
}

impl Curator for GeminiClient {
    async fn propose(
        &self,
        request: &CurationRequest,
        history: &[String],
    ) -> Result<Vec<Candidate>, CurationError> {
        info!("[Gemini] Processing query: '{}'...", request.query.trim());

        let pb = ProgressBar::new_spinner();
        pb.set_message(format!("Waiting for {}...", self.model()));
        pb.enable_steady_tick(Duration::from_millis(100));
        if let Ok(style) = ProgressStyle::with_template("{spinner:.blue} {msg}") {
            pb.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
        }

        let prompt = build_prompt(request, history);
        let result = self.generate(&prompt).await;
        pb.finish_and_clear();

        parse_candidates(&result?)
    }
}

/// Request body with the generation options used for curation.
pub fn generate_request(prompt: &str) -> GenerateContentRequest {
    GenerateContentRequest {
        contents: vec![Content {
            role: Some("user".to_string()),
            parts: vec![Part {
                text: Some(prompt.to_string()),
            }],
        }],
        generation_config: GenerationConfig {
            temperature: 1.0,
            top_p: 0.95,
            response_mime_type: "application/json".to_string(),
        },
        safety_settings: HARM_CATEGORIES
            .iter()
            .map(|category| SafetySetting {
                category: category.to_string(),
                threshold: "BLOCK_NONE".to_string(),
            })
            .collect(),
    }
}

/// Extracts the text of the first candidate, mapping safety blocks to
/// [`CurationError::Blocked`].
pub fn response_text(response: GenerateContentResponse) -> Result<String, CurationError> {
    if let Some(reason) = response
        .prompt_feedback
        .and_then(|feedback| feedback.block_reason)
    {
        return Err(CurationError::Blocked(reason));
    }

    let Some(candidate) = response.candidates.into_iter().next() else {
        return Err(CurationError::EmptyResponse);
    };

    let text: String = candidate
        .content
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect()
        })
        .unwrap_or_default();

    if text.trim().is_empty() {
        return match candidate.finish_reason {
            Some(reason) if BLOCKING_FINISH_REASONS.contains(&reason.as_str()) => {
                Err(CurationError::Blocked(reason))
            }
            _ => Err(CurationError::EmptyResponse),
        };
    }

    Ok(text)
}

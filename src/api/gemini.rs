//! Provides a client for the Gemini `generateContent` API.

use crate::api::ensure_success;
use crate::config::GeminiConfig;
use crate::error::{AppError, Result};
use crate::models::{GenerateContentRequest, GenerateContentResponse};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Code generation can take minutes on the larger models.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

/// An asynchronous client for the Gemini generative language API.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl GeminiClient {
    /// Creates a new `GeminiClient` from configuration.
    pub fn new(client: Client, config: &GeminiConfig) -> Self {
        Self {
            client,
            api_key: config.api_key.clone(),
            base_url: config.api_url.clone(),
            model: normalize_model(&config.model),
        }
    }

    /// Creates a client against a custom base URL (e.g. a mock server).
    #[cfg(test)]
    pub fn new_with_base_url(api_key: &str, model: &str, base_url: &str) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: normalize_model(model),
        }
    }

    /// Model id without the `models/` prefix.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Sends `prompt` as a single user turn and returns the model's text answer.
    pub async fn generate_content(&self, prompt: &str) -> Result<String> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );
        info!("Calling Gemini model {}", self.model);
        debug!("Prompt is {} characters long", prompt.len());

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .timeout(REQUEST_TIMEOUT)
            .json(&GenerateContentRequest::from_prompt(prompt))
            .send()
            .await
            .map_err(|e| {
                error!("Error calling Gemini: {}", e);
                AppError::from(e)
            })?;

        let response = ensure_success("gemini", response).await?;

        let body: GenerateContentResponse = response.json().await.map_err(|e| {
            error!("Error parsing Gemini response JSON: {}", e);
            AppError::from(e)
        })?;

        match body.text() {
            Some(text) => Ok(text),
            None => {
                let finish_reason = body
                    .candidates
                    .first()
                    .and_then(|c| c.finish_reason.clone())
                    .unwrap_or_else(|| "none".to_string());
                warn!(
                    "Gemini returned no text (finish reason: {}, prompt feedback: {:?})",
                    finish_reason, body.prompt_feedback
                );
                Err(AppError::Llm(format!(
                    "response contained no text (finish reason: {})",
                    finish_reason
                )))
            },
        }
    }
}

fn normalize_model(model: &str) -> String {
    model.trim().trim_start_matches("models/").to_string()
}

use crate::{
    error::{GenChatError, Result},
    gemini::{
        traits::TextGenerator,
        wire::{prompt_payload, upstream_error, GeminiResponse},
    },
    models::{ModelCategory, ModelInfo, TextGenerationResponse},
};
use async_trait::async_trait;
use reqwest::Client;

#[derive(Clone)]
pub struct TextClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl TextClient {
    pub fn new(client: Client, base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            api_key,
        }
    }

    pub fn supported_models() -> Vec<ModelInfo> {
        vec![
            ModelInfo {
                id: "gemini-1.5-flash".to_string(),
                name: "Gemini 1.5".to_string(),
                category: ModelCategory::Text,
                description: "Fast general-purpose text model".to_string(),
            },
            ModelInfo {
                id: "gemini-2.0-flash-lite".to_string(),
                name: "Gemini 2.0 Flash Lite".to_string(),
                category: ModelCategory::Text,
                description: "Cost-efficient low-latency text model".to_string(),
            },
            ModelInfo {
                id: "gemini-2.0-flash".to_string(),
                name: "Gemini 2.0 Flash".to_string(),
                category: ModelCategory::Text,
                description: "Next-generation general-purpose model".to_string(),
            },
        ]
    }

    pub fn supports(model_id: &str) -> bool {
        Self::supported_models().iter().any(|m| m.id == model_id)
    }
}

#[async_trait]
impl TextGenerator for TextClient {
    async fn generate_text(&self, model: &str, prompt: &str) -> Result<TextGenerationResponse> {
        let api_key = self
            .api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                GenChatError::ConfigError("GEMINI_API_KEY is missing from environment variables".into())
            })?;

        let url = format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            model
        );

        log::info!("Invoking text model: {}", model);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&prompt_payload(prompt, None))
            .send()
            .await
            .map_err(|e| {
                log::error!("Gemini request failed: {}", e);
                GenChatError::RequestError(format!("Gemini request failed: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let err = upstream_error(status.as_u16(), &body);
            log::error!("Gemini rejected text generation: {}", err);
            return Err(err);
        }

        let data: GeminiResponse = response
            .json()
            .await
            .map_err(|e| GenChatError::DecodeError(format!("malformed Gemini response: {}", e)))?;

        if data.candidates.is_empty() {
            return Err(GenChatError::DecodeError(
                "No candidates in Gemini response".into(),
            ));
        }

        Ok(TextGenerationResponse {
            text: data.text(),
            model: model.to_string(),
            finish_reason: data.finish_reason(),
            usage: data.usage(),
        })
    }
}

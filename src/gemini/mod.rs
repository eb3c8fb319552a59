pub mod image_client;
pub mod sse;
pub mod text_client;
pub mod traits;
pub mod wire;

use crate::{
    config::GeminiConfig,
    error::{GenChatError, Result},
};
use reqwest::Client;

pub use image_client::ImageClient;
pub use sse::SseDecoder;
pub use text_client::TextClient;
pub use traits::{ChunkStream, ImageGenerator, TextGenerator};

/// Gemini API access, sharing one connection pool between text and image calls.
#[derive(Clone)]
pub struct GeminiClient {
    text_client: TextClient,
    image_client: ImageClient,
}

impl GeminiClient {
    pub fn new(config: &GeminiConfig) -> Result<Self> {
        let client = Client::builder()
            .pool_max_idle_per_host(10)
            .build()
            .map_err(|e| GenChatError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        if config.api_key.is_none() {
            log::warn!("GEMINI_API_KEY is not set, generation requests will fail");
        }

        Ok(Self {
            text_client: TextClient::new(client.clone(), &config.base_url, config.api_key.clone()),
            image_client: ImageClient::new(client, &config.base_url, config.api_key.clone()),
        })
    }

    pub fn text(&self) -> &TextClient {
        &self.text_client
    }

    pub fn image(&self) -> &ImageClient {
        &self.image_client
    }
}

use crate::{
    error::{GenChatError, Result},
    gemini::{
        sse::SseDecoder,
        traits::{ChunkStream, ImageGenerator},
        wire::{classify_chunk, image_generation_config, prompt_payload, upstream_error},
    },
    models::{InvocationConfig, ModelCategory, ModelInfo},
};
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;
use tokio_stream::wrappers::ReceiverStream;

#[derive(Clone)]
pub struct ImageClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl ImageClient {
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
                id: "gemini-2.0-flash-preview-image-generation".to_string(),
                name: "Gemini 2.0 Flash (Image)".to_string(),
                category: ModelCategory::Image,
                description: "Conversational image generation and editing".to_string(),
            },
            ModelInfo {
                id: "gemini-2.0-flash-exp".to_string(),
                name: "Gemini 2.0 Flash Experimental".to_string(),
                category: ModelCategory::Image,
                description: "Experimental multi-modal output".to_string(),
            },
            ModelInfo {
                id: "gemini-2.5-flash-image-preview".to_string(),
                name: "Gemini 2.5 Flash Image".to_string(),
                category: ModelCategory::Image,
                description: "Image generation and editing preview".to_string(),
            },
        ]
    }

    pub fn supports(model_id: &str) -> bool {
        Self::supported_models().iter().any(|m| m.id == model_id)
    }

    fn api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                GenChatError::ConfigError("GEMINI_API_KEY is missing from environment variables".into())
            })
    }
}

#[async_trait]
impl ImageGenerator for ImageClient {
    async fn stream_image(
        &self,
        invocation: &InvocationConfig,
        prompt: &str,
    ) -> Result<ChunkStream> {
        let api_key = self.api_key()?;
        let payload = prompt_payload(prompt, Some(image_generation_config(invocation)));
        let url = format!(
            "{}/models/{}:streamGenerateContent?alt=sse",
            self.base_url.trim_end_matches('/'),
            invocation.model
        );

        log::info!("Streaming image generation with model: {}", invocation.model);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&payload)
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
            log::error!("Gemini rejected image generation: {}", err);
            return Err(err);
        }

        // Capacity 1: the reader never runs more than one chunk ahead of the consumer.
        let (tx, rx) = tokio::sync::mpsc::channel(1);
        let byte_stream = response.bytes_stream();

        tokio::spawn(async move {
            futures::pin_mut!(byte_stream);
            let mut decoder = SseDecoder::new();

            loop {
                let next = tokio::select! {
                    _ = tx.closed() => {
                        log::debug!("Image stream consumer hung up, closing upstream connection");
                        return;
                    }
                    next = byte_stream.next() => next,
                };

                let payloads = match next {
                    Some(Ok(bytes)) => decoder.push(&bytes),
                    Some(Err(e)) => Err(GenChatError::RequestError(format!(
                        "Gemini stream interrupted: {}",
                        e
                    ))),
                    None => break,
                };

                match payloads {
                    Ok(payloads) => {
                        for payload in payloads {
                            let chunk = classify_chunk(&payload);
                            let failed = chunk.is_err();
                            if tx.send(chunk).await.is_err() || failed {
                                return;
                            }
                        }
                    }
                    Err(e) => {
                        let _ = tx.send(Err(e)).await;
                        return;
                    }
                }
            }

            match decoder.finish() {
                Ok(Some(payload)) => {
                    let _ = tx.send(classify_chunk(&payload)).await;
                }
                Ok(None) => {}
                Err(e) => {
                    let _ = tx.send(Err(e)).await;
                }
            }
        });

        Ok(Box::pin(ReceiverStream::new(rx)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supported_models() {
        assert!(ImageClient::supports("gemini-2.0-flash-preview-image-generation"));
        assert!(!ImageClient::supports("gemini-1.5-flash"));
        assert!(ImageClient::supported_models()
            .iter()
            .all(|m| m.category == ModelCategory::Image));
    }

    #[tokio::test]
    async fn test_missing_key_fails_before_network() {
        // Unroutable base URL: reaching the network would surface a RequestError instead.
        let client = ImageClient::new(Client::new(), "http://127.0.0.1:9", None);
        let invocation = InvocationConfig::image("gemini-2.0-flash-preview-image-generation");
        match client.stream_image(&invocation, "a cat").await {
            Err(GenChatError::ConfigError(msg)) => assert!(msg.contains("GEMINI_API_KEY")),
            Err(other) => panic!("unexpected error: {}", other),
            Ok(_) => panic!("expected a configuration error"),
        }
    }
}

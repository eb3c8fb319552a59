use async_trait::async_trait;
use futures::stream::Stream;
use std::pin::Pin;

use crate::{
    error::Result,
    models::{InvocationConfig, StreamChunk, TextGenerationResponse},
};

/// Lazy, finite, non-restartable sequence of classified chunks.
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<StreamChunk>> + Send>>;

#[async_trait]
pub trait ImageGenerator: Send + Sync {
    /// Opens a streamed multi-modal generation for `prompt`.
    async fn stream_image(&self, invocation: &InvocationConfig, prompt: &str)
        -> Result<ChunkStream>;
}

#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate_text(&self, model: &str, prompt: &str) -> Result<TextGenerationResponse>;
}

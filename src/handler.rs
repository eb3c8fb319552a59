//! Request orchestration: validate, generate, persist, shape the response.

use futures::StreamExt;
use std::sync::Arc;
use std::time::Duration;

use crate::{
    error::{GenChatError, Result},
    gemini::{ChunkStream, ImageClient, ImageGenerator, TextClient, TextGenerator},
    logger,
    models::{
        ImageGenerationRequest, ImageGenerationResponse, InlineImage, InvocationConfig,
        StreamChunk, TextGenerationRequest, TextGenerationResponse,
    },
    storage::ArtifactStore,
};

pub const NO_PROMPT_MESSAGE: &str = "No prompt provided";

/// Returns the prompt if it is present and not blank.
pub fn validate_prompt(prompt: Option<&str>) -> Result<&str> {
    match prompt {
        Some(p) if !p.trim().is_empty() => Ok(p),
        _ => Err(GenChatError::ValidationError(NO_PROMPT_MESSAGE.into())),
    }
}

/// Where a single request is in its scan of the model stream.
#[derive(Debug)]
enum ScanState {
    AwaitingImage,
    Done(Option<InlineImage>),
}

/// Reads chunks in arrival order until the first image or the end of the stream.
///
/// The stream is dropped on return, so anything after the first image is never read.
async fn scan_for_image(mut stream: ChunkStream) -> Result<Option<InlineImage>> {
    let mut state = ScanState::AwaitingImage;
    let mut seen = 0usize;

    while let ScanState::AwaitingImage = state {
        state = match stream.next().await {
            Some(Ok(StreamChunk::Image(image))) => {
                log::debug!("Image found in chunk {} ({} bytes)", seen, image.bytes.len());
                ScanState::Done(Some(image))
            }
            Some(Ok(StreamChunk::Text(text))) => {
                log::debug!("Model text in chunk {}: {}", seen, text);
                ScanState::AwaitingImage
            }
            Some(Ok(StreamChunk::Empty)) => ScanState::AwaitingImage,
            Some(Err(e)) => {
                log::error!("Image stream failed after {} chunks: {}", seen, e);
                return Err(e);
            }
            None => {
                log::debug!("Image stream ended after {} chunks without an image", seen);
                ScanState::Done(None)
            }
        };
        seen += 1;
    }

    match state {
        ScanState::Done(image) => Ok(image),
        ScanState::AwaitingImage => Ok(None),
    }
}

pub struct ImageService {
    generator: Arc<dyn ImageGenerator>,
    store: Arc<dyn ArtifactStore>,
    default_model: String,
    deadline: Option<Duration>,
}

impl ImageService {
    pub fn new(
        generator: Arc<dyn ImageGenerator>,
        store: Arc<dyn ArtifactStore>,
        default_model: impl Into<String>,
    ) -> Self {
        Self {
            generator,
            store,
            default_model: default_model.into(),
            deadline: None,
        }
    }

    pub fn with_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.deadline = deadline;
        self
    }

    /// Image models pass through; any other id falls back to the default.
    fn invocation_for(&self, model: Option<&str>) -> InvocationConfig {
        match model {
            None => InvocationConfig::image(self.default_model.as_str()),
            Some(m) if m == self.default_model || ImageClient::supports(m) => {
                InvocationConfig::image(m)
            }
            Some(m) => {
                log::debug!(
                    "{} is not an image model, using {}",
                    m,
                    self.default_model
                );
                InvocationConfig::image(self.default_model.as_str())
            }
        }
    }

    /// Generates an image for the request and returns its retrieval URL.
    ///
    /// A stream without any image yields an empty URL rather than an error.
    pub async fn generate(&self, request: ImageGenerationRequest) -> Result<ImageGenerationResponse> {
        let prompt = validate_prompt(request.prompt.as_deref())?;
        let invocation = self.invocation_for(request.model.as_deref());
        let _timer = logger::timer("Image generation");

        match self.deadline {
            Some(deadline) => tokio::time::timeout(deadline, self.run(&invocation, prompt))
                .await
                .map_err(|_| {
                    log::error!("Image generation exceeded {:?}", deadline);
                    GenChatError::TimeoutError(deadline.as_millis() as u64)
                })?,
            None => self.run(&invocation, prompt).await,
        }
    }

    async fn run(&self, invocation: &InvocationConfig, prompt: &str) -> Result<ImageGenerationResponse> {
        let stream = self.generator.stream_image(invocation, prompt).await?;

        let Some(image) = scan_for_image(stream).await? else {
            log::warn!("Model {} returned no image", invocation.model);
            return Ok(ImageGenerationResponse::empty());
        };

        let artifact = self.store.upload(image.bytes, &image.mime_type).await?;
        Ok(ImageGenerationResponse {
            image_url: artifact.url,
        })
    }
}

pub struct TextService {
    generator: Arc<dyn TextGenerator>,
    default_model: String,
}

impl TextService {
    pub fn new(generator: Arc<dyn TextGenerator>, default_model: impl Into<String>) -> Self {
        Self {
            generator,
            default_model: default_model.into(),
        }
    }

    pub async fn generate(&self, request: TextGenerationRequest) -> Result<TextGenerationResponse> {
        let prompt = validate_prompt(request.prompt.as_deref())?;
        let model = match request.model.as_deref() {
            None => self.default_model.as_str(),
            Some(m) if m == self.default_model || TextClient::supports(m) => m,
            Some(m) => {
                return Err(GenChatError::ValidationError(format!(
                    "Unsupported text model: {}",
                    m
                )))
            }
        };
        self.generator.generate_text(model, prompt).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;

    fn chunks(items: Vec<Result<StreamChunk>>) -> ChunkStream {
        Box::pin(stream::iter(items))
    }

    fn png(bytes: &[u8]) -> StreamChunk {
        StreamChunk::Image(InlineImage {
            mime_type: "image/png".into(),
            bytes: bytes.to_vec(),
        })
    }

    #[test]
    fn test_validate_prompt() {
        assert_eq!(validate_prompt(Some("a cat")).unwrap(), "a cat");
        assert!(validate_prompt(Some("")).is_err());
        assert!(validate_prompt(Some("  \n\t")).is_err());
        assert!(validate_prompt(None).is_err());
    }

    #[tokio::test]
    async fn test_scan_takes_first_image() {
        let stream = chunks(vec![
            Ok(StreamChunk::Text("working on it".into())),
            Ok(png(&[1])),
            Ok(png(&[2])),
        ]);
        let image = scan_for_image(stream).await.unwrap().unwrap();
        assert_eq!(image.bytes, vec![1]);
    }

    #[tokio::test]
    async fn test_scan_stops_before_later_errors() {
        let stream = chunks(vec![
            Ok(png(&[9])),
            Err(GenChatError::DecodeError("never read".into())),
        ]);
        assert!(scan_for_image(stream).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_scan_exhausted_and_failed() {
        let empty = chunks(vec![Ok(StreamChunk::Empty), Ok(StreamChunk::Text("no".into()))]);
        assert!(scan_for_image(empty).await.unwrap().is_none());

        let failing = chunks(vec![
            Ok(StreamChunk::Empty),
            Err(GenChatError::UpstreamError {
                status: 500,
                message: "boom".into(),
            }),
            Ok(png(&[1])),
        ]);
        assert!(matches!(
            scan_for_image(failing).await,
            Err(GenChatError::UpstreamError { .. })
        ));
    }
}

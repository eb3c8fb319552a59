#![allow(dead_code)]

use async_trait::async_trait;
use futures::stream;
use genchat::{
    storage::object_path, ArtifactStore, ChunkStream, GenChatError, ImageGenerator, InlineImage,
    InvocationConfig, Result, StoredArtifact, StreamChunk, TextGenerationResponse, TextGenerator,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// One scripted element of a fake model stream.
#[derive(Clone)]
pub enum Scripted {
    Chunk(StreamChunk),
    Fail(u16, String),
}

pub fn text(t: &str) -> Scripted {
    Scripted::Chunk(StreamChunk::Text(t.to_string()))
}

pub fn image(bytes: &[u8]) -> Scripted {
    Scripted::Chunk(StreamChunk::Image(InlineImage {
        mime_type: "image/png".to_string(),
        bytes: bytes.to_vec(),
    }))
}

pub enum Behaviour {
    Stream(Vec<Scripted>),
    Hang,
    Reject(fn() -> GenChatError),
}

pub struct FakeGenerator {
    behaviour: Behaviour,
    calls: AtomicUsize,
    invocations: Mutex<Vec<(InvocationConfig, String)>>,
}

impl FakeGenerator {
    pub fn streaming(script: Vec<Scripted>) -> Self {
        Self::with(Behaviour::Stream(script))
    }

    pub fn with(behaviour: Behaviour) -> Self {
        Self {
            behaviour,
            calls: AtomicUsize::new(0),
            invocations: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn invocations(&self) -> Vec<(InvocationConfig, String)> {
        self.invocations.lock().unwrap().clone()
    }
}

#[async_trait]
impl ImageGenerator for FakeGenerator {
    async fn stream_image(
        &self,
        invocation: &InvocationConfig,
        prompt: &str,
    ) -> Result<ChunkStream> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.invocations
            .lock()
            .unwrap()
            .push((invocation.clone(), prompt.to_string()));

        match &self.behaviour {
            Behaviour::Stream(script) => {
                let items: Vec<Result<StreamChunk>> = script
                    .iter()
                    .cloned()
                    .map(|s| match s {
                        Scripted::Chunk(chunk) => Ok(chunk),
                        Scripted::Fail(status, message) => {
                            Err(GenChatError::UpstreamError { status, message })
                        }
                    })
                    .collect();
                Ok(Box::pin(stream::iter(items)))
            }
            Behaviour::Hang => Ok(Box::pin(stream::pending::<Result<StreamChunk>>())),
            Behaviour::Reject(make) => Err(make()),
        }
    }
}

pub struct FakeStore {
    fail: bool,
    uploads: Mutex<Vec<(Vec<u8>, String, String)>>,
}

impl FakeStore {
    pub fn new() -> Self {
        Self {
            fail: false,
            uploads: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            uploads: Mutex::new(Vec::new()),
        }
    }

    pub fn upload_count(&self) -> usize {
        self.uploads.lock().unwrap().len()
    }

    /// (bytes, mime type, url) per upload.
    pub fn uploads(&self) -> Vec<(Vec<u8>, String, String)> {
        self.uploads.lock().unwrap().clone()
    }
}

#[async_trait]
impl ArtifactStore for FakeStore {
    async fn upload(&self, content: Vec<u8>, mime_type: &str) -> Result<StoredArtifact> {
        if self.fail {
            return Err(GenChatError::StorageError("bucket unavailable".into()));
        }
        let path = object_path(mime_type);
        let url = format!("https://store.example/{}", path);
        self.uploads
            .lock()
            .unwrap()
            .push((content, mime_type.to_string(), url.clone()));
        Ok(StoredArtifact {
            path,
            url,
            expires_in_secs: 3600,
        })
    }
}

pub struct FakeText {
    calls: AtomicUsize,
    models: Mutex<Vec<String>>,
}

impl FakeText {
    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            models: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn models(&self) -> Vec<String> {
        self.models.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for FakeText {
    async fn generate_text(&self, model: &str, prompt: &str) -> Result<TextGenerationResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.models.lock().unwrap().push(model.to_string());
        Ok(TextGenerationResponse {
            text: format!("echo: {}", prompt),
            model: model.to_string(),
            finish_reason: Some("STOP".to_string()),
            usage: None,
        })
    }
}

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfo {
    pub id: String,
    pub name: String,
    pub category: ModelCategory,
    pub description: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ModelCategory {
    Text,
    Image,
}

/// Output modality requested from a multi-modal model.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum Modality {
    Image,
    Text,
}

/// Per-request model invocation settings. Built fresh for every request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationConfig {
    pub model: String,
    pub response_modalities: Vec<Modality>,
    pub response_mime_type: String,
}

impl InvocationConfig {
    pub fn image(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            response_modalities: vec![Modality::Image, Modality::Text],
            response_mime_type: "text/plain".to_string(),
        }
    }
}

/// Image bytes carried inline in a model response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineImage {
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// One element of a streamed generation, classified at decode time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamChunk {
    Text(String),
    Image(InlineImage),
    Empty,
}

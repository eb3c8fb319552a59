//! Gemini `generateContent` wire types and chunk classification.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{
    error::{GenChatError, Result},
    models::{InlineImage, InvocationConfig, StreamChunk, TokenUsage},
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiResponse {
    #[serde(default)]
    pub candidates: Vec<GeminiCandidate>,
    pub usage_metadata: Option<GeminiUsage>,
    pub error: Option<GeminiErrorBody>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiCandidate {
    pub content: Option<GeminiContent>,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GeminiContent {
    #[serde(default)]
    pub parts: Vec<GeminiPart>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiPart {
    pub text: Option<String>,
    pub inline_data: Option<GeminiInlineData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiInlineData {
    pub mime_type: String,
    pub data: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiUsage {
    #[serde(default)]
    pub prompt_token_count: u32,
    #[serde(default)]
    pub candidates_token_count: u32,
    #[serde(default)]
    pub total_token_count: u32,
}

#[derive(Debug, Deserialize)]
pub struct GeminiErrorBody {
    pub code: Option<u16>,
    #[serde(default)]
    pub message: String,
    pub status: Option<String>,
}

#[derive(Deserialize)]
struct GeminiErrorEnvelope {
    error: GeminiErrorBody,
}

impl GeminiResponse {
    fn first_parts(&self) -> &[GeminiPart] {
        self.candidates
            .first()
            .and_then(|candidate| candidate.content.as_ref())
            .map(|content| content.parts.as_slice())
            .unwrap_or(&[])
    }

    pub fn text(&self) -> String {
        self.first_parts()
            .iter()
            .filter_map(|part| part.text.as_deref())
            .collect()
    }

    pub fn finish_reason(&self) -> Option<String> {
        self.candidates
            .first()
            .and_then(|candidate| candidate.finish_reason.clone())
    }

    pub fn usage(&self) -> Option<TokenUsage> {
        self.usage_metadata.as_ref().map(|u| TokenUsage {
            prompt_tokens: u.prompt_token_count,
            completion_tokens: u.candidates_token_count,
            total_tokens: u.total_token_count,
        })
    }
}

/// Request body for a single-turn prompt.
pub fn prompt_payload(prompt: &str, generation_config: Option<Value>) -> Value {
    let mut payload = json!({
        "contents": [
            {
                "role": "user",
                "parts": [{ "text": prompt }]
            }
        ]
    });
    if let (Some(config), Some(obj)) = (generation_config, payload.as_object_mut()) {
        obj.insert("generationConfig".to_string(), config);
    }
    payload
}

pub fn image_generation_config(invocation: &InvocationConfig) -> Value {
    json!({
        "responseModalities": invocation.response_modalities,
        "responseMimeType": invocation.response_mime_type,
    })
}

/// Decodes one streamed payload and classifies it as text, image or empty.
///
/// Only the first candidate is inspected. The first part carrying inline data
/// wins; otherwise text parts are concatenated.
pub fn classify_chunk(payload: &str) -> Result<StreamChunk> {
    let response: GeminiResponse = serde_json::from_str(payload)
        .map_err(|e| GenChatError::DecodeError(format!("malformed stream chunk: {}", e)))?;

    if let Some(error) = response.error {
        return Err(GenChatError::UpstreamError {
            status: error.code.unwrap_or(500),
            message: error.message,
        });
    }

    let parts = response.first_parts();
    if let Some(inline) = parts.iter().find_map(|part| part.inline_data.as_ref()) {
        let bytes = STANDARD
            .decode(inline.data.trim())
            .map_err(|e| GenChatError::DecodeError(format!("invalid base64 image data: {}", e)))?;
        return Ok(StreamChunk::Image(InlineImage {
            mime_type: inline.mime_type.clone(),
            bytes,
        }));
    }

    let text = response.text();
    if text.is_empty() {
        Ok(StreamChunk::Empty)
    } else {
        Ok(StreamChunk::Text(text))
    }
}

/// Builds an upstream error from a non-success response body, preferring the
/// message from Google's error envelope.
pub fn upstream_error(status: u16, body: &str) -> GenChatError {
    let message = serde_json::from_str::<GeminiErrorEnvelope>(body)
        .map(|envelope| match envelope.error.status {
            Some(code) => format!("{}: {}", code, envelope.error.message),
            None => envelope.error.message,
        })
        .unwrap_or_else(|_| body.trim().to_string());
    GenChatError::UpstreamError { status, message }
}

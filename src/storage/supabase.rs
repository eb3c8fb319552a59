use crate::{
    config::StorageConfig,
    error::{GenChatError, Result},
    models::StoredArtifact,
    storage::{object_path, traits::ArtifactStore},
};
use async_trait::async_trait;
use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION, CACHE_CONTROL, CONTENT_TYPE},
    Client,
};
use serde::Deserialize;
use serde_json::json;

/// Supabase Storage backend. Objects stay private; reads go through signed URLs
/// that expire `signed_url_ttl_secs` after minting.
pub struct SupabaseStore {
    client: Client,
    base_url: String,
    key: String,
    bucket: String,
    signed_url_ttl_secs: u64,
}

#[derive(Deserialize)]
struct SignedUrlResponse {
    #[serde(rename = "signedURL", alias = "signedUrl")]
    signed_url: String,
}

impl SupabaseStore {
    pub fn new(config: StorageConfig) -> Result<Self> {
        Self::with_client(config, Client::new())
    }

    pub fn with_client(config: StorageConfig, client: Client) -> Result<Self> {
        let base_url = config
            .url
            .ok_or_else(|| GenChatError::ConfigError("Supabase URL is required".into()))?;

        let key = config
            .key
            .ok_or_else(|| GenChatError::ConfigError("Supabase key is required".into()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            key,
            bucket: config.bucket,
            signed_url_ttl_secs: config.signed_url_ttl_secs,
        })
    }

    fn build_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        let bearer = HeaderValue::from_str(&format!("Bearer {}", self.key))
            .map_err(|e| GenChatError::ConfigError(format!("Invalid Supabase key: {}", e)))?;
        let apikey = HeaderValue::from_str(&self.key)
            .map_err(|e| GenChatError::ConfigError(format!("Invalid Supabase key: {}", e)))?;
        headers.insert(AUTHORIZATION, bearer);
        headers.insert("apikey", apikey);
        Ok(headers)
    }

    fn storage_url(&self, suffix: &str) -> String {
        format!("{}/storage/v1{}", self.base_url, suffix)
    }

    async fn put_object(&self, path: &str, content: Vec<u8>, mime_type: &str) -> Result<()> {
        let url = self.storage_url(&format!("/object/{}/{}", self.bucket, path));
        let content_type = HeaderValue::from_str(mime_type)
            .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream"));

        let response = self
            .client
            .post(&url)
            .headers(self.build_headers()?)
            .header(CONTENT_TYPE, content_type)
            .header(CACHE_CONTROL, "max-age=3600")
            .header("x-upsert", "false")
            .body(content)
            .send()
            .await
            .map_err(|e| GenChatError::StorageError(format!("Upload request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let error_text = response.text().await.unwrap_or_default();
            return Err(GenChatError::StorageError(format!(
                "Upload of {} failed ({}): {}",
                path, status, error_text
            )));
        }

        Ok(())
    }

    async fn sign_url(&self, path: &str) -> Result<String> {
        let url = self.storage_url(&format!("/object/sign/{}/{}", self.bucket, path));

        let response = self
            .client
            .post(&url)
            .headers(self.build_headers()?)
            .json(&json!({ "expiresIn": self.signed_url_ttl_secs }))
            .send()
            .await
            .map_err(|e| GenChatError::StorageError(format!("Signing request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let error_text = response.text().await.unwrap_or_default();
            return Err(GenChatError::StorageError(format!(
                "Signing {} failed ({}): {}",
                path, status, error_text
            )));
        }

        let signed: SignedUrlResponse = response
            .json()
            .await
            .map_err(|e| GenChatError::StorageError(format!("Failed to create signed URL: {}", e)))?;

        // Supabase answers with a path relative to the storage API root.
        if signed.signed_url.starts_with("http://") || signed.signed_url.starts_with("https://") {
            Ok(signed.signed_url)
        } else if signed.signed_url.starts_with('/') {
            Ok(self.storage_url(&signed.signed_url))
        } else {
            Ok(self.storage_url(&format!("/{}", signed.signed_url)))
        }
    }
}

#[async_trait]
impl ArtifactStore for SupabaseStore {
    async fn upload(&self, content: Vec<u8>, mime_type: &str) -> Result<StoredArtifact> {
        let path = object_path(mime_type);
        let size = content.len();

        let result = async {
            self.put_object(&path, content, mime_type).await?;
            self.sign_url(&path).await
        }
        .await;

        match result {
            Ok(url) => {
                log::info!("Stored {} bytes at {}/{}", size, self.bucket, path);
                Ok(StoredArtifact {
                    path,
                    url,
                    expires_in_secs: self.signed_url_ttl_secs,
                })
            }
            Err(e) => {
                log::error!("Error uploading to Supabase: {}", e);
                Err(e)
            }
        }
    }
}

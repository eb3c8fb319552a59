use crate::{error::Result, models::StoredArtifact};
use async_trait::async_trait;

#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Writes `content` under a fresh object name and returns a retrievable URL.
    ///
    /// Never overwrites an existing object.
    async fn upload(&self, content: Vec<u8>, mime_type: &str) -> Result<StoredArtifact>;
}

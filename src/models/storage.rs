use serde::{Deserialize, Serialize};

/// An object written to the artifact bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredArtifact {
    /// Object path inside the bucket, e.g. `generated/<uuid>.png`.
    pub path: String,
    pub url: String,
    pub expires_in_secs: u64,
}

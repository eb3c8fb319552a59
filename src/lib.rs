pub mod config;
pub mod error;
pub mod gemini;
pub mod handler;
pub mod logger;
pub mod models;
#[cfg(feature = "server")]
pub mod server;
pub mod storage;

pub use config::{Config, GeminiConfig, StorageConfig};
pub use error::{GenChatError, Result};
pub use gemini::{
    ChunkStream, GeminiClient, ImageClient, ImageGenerator, SseDecoder, TextClient, TextGenerator,
};
pub use handler::{ImageService, TextService};
pub use models::*;
pub use storage::{ArtifactStore, SupabaseStore};

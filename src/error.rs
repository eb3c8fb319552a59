use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenChatError {
    #[error("{0}")]
    ValidationError(String),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Request error: {0}")]
    RequestError(String),
    #[error("Upstream error ({status}): {message}")]
    UpstreamError { status: u16, message: String },
    #[error("Decode error: {0}")]
    DecodeError(String),
    #[error("Storage error: {0}")]
    StorageError(String),
    #[error("Generation timed out after {0}ms")]
    TimeoutError(u64),
}

impl GenChatError {
    /// HTTP status this error is reported with.
    pub fn http_status(&self) -> u16 {
        match self {
            GenChatError::ValidationError(_) => 400,
            GenChatError::ConfigError(_) => 500,
            GenChatError::RequestError(_)
            | GenChatError::UpstreamError { .. }
            | GenChatError::DecodeError(_)
            | GenChatError::StorageError(_) => 502,
            GenChatError::TimeoutError(_) => 504,
        }
    }
}

pub type Result<T> = std::result::Result<T, GenChatError>;

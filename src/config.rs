use std::env;
use std::time::Duration;

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_IMAGE_MODEL: &str = "gemini-2.0-flash-preview-image-generation";
pub const DEFAULT_TEXT_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_BUCKET: &str = "images";
pub const DEFAULT_SIGNED_URL_TTL_SECS: u64 = 3600;

/// First non-empty value among the given environment variables.
fn env_any(keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| env::var(key).ok())
        .find(|value| !value.trim().is_empty())
}

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub image_model: String,
    pub text_model: String,
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub url: Option<String>,
    pub key: Option<String>,
    pub bucket: String,
    pub signed_url_ttl_secs: u64,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: Option<u16>,
    pub gemini: GeminiConfig,
    pub storage: StorageConfig,
    pub generation_timeout_secs: Option<u64>,
    pub log_level: Option<String>,
    pub log_json: bool,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        GeminiConfig {
            api_key: None,
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
            text_model: DEFAULT_TEXT_MODEL.to_string(),
        }
    }
}

impl GeminiConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let defaults = Self::default();
        GeminiConfig {
            api_key: env_any(&["GEMINI_API_KEY", "NEXT_PUBLIC_GEMINI_API_KEY"]),
            base_url: env_any(&["GEMINI_BASE_URL"]).unwrap_or(defaults.base_url),
            image_model: env_any(&["GEMINI_IMAGE_MODEL"]).unwrap_or(defaults.image_model),
            text_model: env_any(&["GEMINI_TEXT_MODEL"]).unwrap_or(defaults.text_model),
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_image_model(mut self, model: impl Into<String>) -> Self {
        self.image_model = model.into();
        self
    }

    pub fn with_text_model(mut self, model: impl Into<String>) -> Self {
        self.text_model = model.into();
        self
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig {
            url: None,
            key: None,
            bucket: DEFAULT_BUCKET.to_string(),
            signed_url_ttl_secs: DEFAULT_SIGNED_URL_TTL_SECS,
        }
    }
}

impl StorageConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let defaults = Self::default();
        StorageConfig {
            url: env_any(&["SUPABASE_URL", "NEXT_PUBLIC_SUPABASE_URL"]),
            key: env_any(&["SUPABASE_KEY", "NEXT_PUBLIC_SUPABASE_ANON_KEY"]),
            bucket: env_any(&["SUPABASE_BUCKET"]).unwrap_or(defaults.bucket),
            signed_url_ttl_secs: env_any(&["SIGNED_URL_TTL_SECS"])
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.signed_url_ttl_secs),
        }
    }

    pub fn with_credentials(mut self, url: impl Into<String>, key: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self.key = Some(key.into());
        self
    }

    pub fn with_bucket(mut self, bucket: impl Into<String>) -> Self {
        self.bucket = bucket.into();
        self
    }

    pub fn with_signed_url_ttl(mut self, secs: u64) -> Self {
        self.signed_url_ttl_secs = secs;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            host: "127.0.0.1".to_string(),
            port: None,
            gemini: GeminiConfig::default(),
            storage: StorageConfig::default(),
            generation_timeout_secs: None,
            log_level: None,
            log_json: false,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let host = env_any(&["HOST"]).unwrap_or_else(|| "127.0.0.1".to_string());
        let port = env_any(&["PORT"]).and_then(|port| port.parse().ok());
        let generation_timeout_secs = env_any(&["GENERATION_TIMEOUT_SECS"])
            .and_then(|s| s.parse().ok())
            .filter(|secs| *secs > 0);
        let log_json = env_any(&["LOG_JSON"]).map_or(false, |val| val == "true");

        Config {
            host,
            port,
            gemini: GeminiConfig::from_env(),
            storage: StorageConfig::from_env(),
            generation_timeout_secs,
            log_level: env_any(&["LOG_LEVEL"]),
            log_json,
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn with_gemini(mut self, config: GeminiConfig) -> Self {
        self.gemini = config;
        self
    }

    pub fn with_storage(mut self, config: StorageConfig) -> Self {
        self.storage = config;
        self
    }

    pub fn with_generation_timeout(mut self, secs: u64) -> Self {
        self.generation_timeout_secs = Some(secs);
        self
    }

    pub fn port_or_default(&self) -> u16 {
        self.port.unwrap_or(8080)
    }

    pub fn generation_timeout(&self) -> Option<Duration> {
        self.generation_timeout_secs.map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::new();
        assert_eq!(config.port_or_default(), 8080);
        assert_eq!(config.gemini.image_model, DEFAULT_IMAGE_MODEL);
        assert_eq!(config.storage.bucket, "images");
        assert_eq!(config.storage.signed_url_ttl_secs, 3600);
        assert!(config.generation_timeout().is_none());
    }

    #[test]
    fn test_builders() {
        let config = Config::new()
            .with_port(9000)
            .with_generation_timeout(45)
            .with_gemini(GeminiConfig::new().with_api_key("k").with_base_url("http://x"))
            .with_storage(StorageConfig::new().with_credentials("http://s", "anon").with_bucket("b"));

        assert_eq!(config.port_or_default(), 9000);
        assert_eq!(config.generation_timeout(), Some(Duration::from_secs(45)));
        assert_eq!(config.gemini.api_key.as_deref(), Some("k"));
        assert_eq!(config.gemini.base_url, "http://x");
        assert_eq!(config.storage.url.as_deref(), Some("http://s"));
        assert_eq!(config.storage.bucket, "b");
    }
}

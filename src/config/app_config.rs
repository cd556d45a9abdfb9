use std::path::PathBuf;

use serde::Deserialize;

use crate::domain::memory::MEMORY_CLASS;
use crate::domain::DomainError;
use crate::infrastructure::embedding::DEFAULT_OPENAI_BASE_URL;
use crate::infrastructure::vector_store::DEFAULT_WEAVIATE_URL;

/// Environment variable consulted when `embedding.api_key` is unset
pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub logging: LoggingConfig,
    pub embedding: EmbeddingSettings,
    pub vector_store: VectorStoreSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    pub model: String,
    pub cache_dir: PathBuf,
    pub base_url: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum VectorStoreBackend {
    #[default]
    Weaviate,
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VectorStoreSettings {
    pub backend: VectorStoreBackend,
    pub url: String,
    pub class_name: String,
    pub timeout_secs: u64,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            model: "text-embedding-ada-002".to_string(),
            cache_dir: PathBuf::from(".cache/embeddings"),
            base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            api_key: None,
            timeout_secs: 30,
        }
    }
}

impl EmbeddingSettings {
    /// The configured key, falling back to `OPENAI_API_KEY`
    pub fn resolve_api_key(&self) -> Result<String, DomainError> {
        self.resolve_api_key_with(std::env::var(OPENAI_API_KEY_ENV).ok())
    }

    fn resolve_api_key_with(&self, env_key: Option<String>) -> Result<String, DomainError> {
        self.api_key
            .clone()
            .or(env_key)
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                DomainError::configuration(format!(
                    "No embedding API key: set embedding.api_key or {}",
                    OPENAI_API_KEY_ENV
                ))
            })
    }
}

impl Default for VectorStoreSettings {
    fn default() -> Self {
        Self {
            backend: VectorStoreBackend::default(),
            url: DEFAULT_WEAVIATE_URL.to_string(),
            class_name: MEMORY_CLASS.to_string(),
            timeout_secs: 30,
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

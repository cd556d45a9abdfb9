//! Application configuration

mod app_config;

pub use app_config::{
    AppConfig, EmbeddingSettings, LogFormat, LoggingConfig, VectorStoreBackend,
    VectorStoreSettings, OPENAI_API_KEY_ENV,
};

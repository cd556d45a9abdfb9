//! Project Memory
//!
//! Long-term semantic memory for AI agents, built on:
//! - A content-addressed on-disk embedding cache
//! - A cache-aware embedding router with batch lookups
//! - Memory write and search over a Weaviate-compatible vector store

pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use crate::config::AppConfig;

use std::sync::Arc;
use std::time::Duration;

use crate::config::{EmbeddingSettings, VectorStoreBackend, VectorStoreSettings};
use crate::domain::memory::VectorStore;
use crate::infrastructure::{
    cache::FileEmbeddingCache,
    embedding::OpenAiEmbeddingProvider,
    http_client::HttpClient,
    services::{EmbeddingRouter, MemoryService},
    vector_store::{InMemoryVectorStore, WeaviateVectorStore},
};

/// Open the embedding cache directory, creating it if needed
pub fn create_embedding_cache(
    settings: &EmbeddingSettings,
) -> anyhow::Result<Arc<FileEmbeddingCache>> {
    Ok(Arc::new(FileEmbeddingCache::new(settings.cache_dir.clone())?))
}

/// Build the embedding router backed by the file cache and the OpenAI API
pub fn create_router(config: &AppConfig) -> anyhow::Result<Arc<EmbeddingRouter>> {
    let settings = &config.embedding;
    let api_key = settings.resolve_api_key()?;

    let client = HttpClient::with_timeout(Duration::from_secs(settings.timeout_secs))?;
    let provider =
        OpenAiEmbeddingProvider::with_base_url(client, api_key, settings.base_url.clone());
    let cache = create_embedding_cache(settings)?;

    tracing::debug!(
        model = %settings.model,
        cache_dir = %settings.cache_dir.display(),
        "Embedding router ready"
    );

    Ok(Arc::new(EmbeddingRouter::new(
        settings.model.clone(),
        cache,
        Arc::new(provider),
    )))
}

/// Build the vector store selected by `vector_store.backend`
pub fn create_vector_store(
    settings: &VectorStoreSettings,
) -> anyhow::Result<Arc<dyn VectorStore>> {
    let store: Arc<dyn VectorStore> = match settings.backend {
        VectorStoreBackend::Weaviate => {
            let client = HttpClient::with_timeout(Duration::from_secs(settings.timeout_secs))?;
            Arc::new(WeaviateVectorStore::new(client, settings.url.clone()))
        }
        VectorStoreBackend::Memory => Arc::new(InMemoryVectorStore::new()),
    };

    Ok(store)
}

/// Build the memory service on top of an existing router
pub fn create_memory_service(
    config: &AppConfig,
    router: Arc<EmbeddingRouter>,
) -> anyhow::Result<MemoryService> {
    let store = create_vector_store(&config.vector_store)?;

    Ok(MemoryService::new(
        router,
        store,
        config.vector_store.class_name.clone(),
    ))
}

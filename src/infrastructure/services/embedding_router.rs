//! Embedding router - cache-aware single and batch embedding retrieval

use std::sync::Arc;

use tracing::{debug, instrument, warn};

use crate::domain::cache::{CacheInfo, CacheKey, EmbeddingCache, Metadata};
use crate::domain::embedding::{EmbeddingProvider, EmbeddingRequest, Vector};
use crate::domain::memory::validate_text;
use crate::domain::DomainError;
use crate::infrastructure::observability::{record_cache_lookup, record_provider_call};

/// Routes embedding lookups between the cache and the provider
///
/// Batch lookups make at most one provider call, carrying only the texts the
/// cache could not answer, and always return vectors in input order.
#[derive(Debug)]
pub struct EmbeddingRouter {
    model: String,
    cache: Arc<dyn EmbeddingCache>,
    provider: Arc<dyn EmbeddingProvider>,
}

impl EmbeddingRouter {
    pub fn new(
        model: impl Into<String>,
        cache: Arc<dyn EmbeddingCache>,
        provider: Arc<dyn EmbeddingProvider>,
    ) -> Self {
        Self {
            model: model.into(),
            cache,
            provider,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Embedding for one text, served from the cache when allowed
    #[instrument(skip(self, text, metadata), fields(model = %self.model))]
    pub async fn get_embedding(
        &self,
        text: &str,
        use_cache: bool,
        metadata: Option<&Metadata>,
    ) -> Result<Vector, DomainError> {
        if !validate_text(text) {
            return Err(DomainError::validation("Text must be a non-empty string"));
        }

        let key = CacheKey::for_text(text);

        if use_cache {
            if let Some(entry) = self.cache.load(&key).await {
                record_cache_lookup(&self.model, 1, 0);
                debug!(key = %key, "Embedding cache hit");
                return Ok(entry.embedding);
            }

            record_cache_lookup(&self.model, 0, 1);
            debug!(key = %key, "Embedding cache miss");
        }

        let vector = self
            .request_embeddings(vec![text.to_string()])
            .await
            .map_err(|e| e.with_context("Failed to generate embedding"))?
            .pop()
            .ok_or_else(|| DomainError::internal("Provider reply carried no embedding"))?;

        if use_cache {
            if let Err(e) = self.cache.save(&key, &vector, metadata).await {
                warn!(key = %key, "Failed to cache embedding: {}", e);
            }
        }

        Ok(vector)
    }

    /// Embeddings for several texts, in input order
    ///
    /// Duplicate texts are looked up independently and are not merged.
    #[instrument(skip(self, texts, metadata), fields(model = %self.model, count = texts.len()))]
    pub async fn get_embeddings(
        &self,
        texts: &[String],
        use_cache: bool,
        metadata: Option<&[Metadata]>,
    ) -> Result<Vec<Vector>, DomainError> {
        Self::validate_batch(texts, metadata)?;

        let mut slots: Vec<Option<Vector>> = vec![None; texts.len()];
        let mut pending: Vec<usize> = Vec::new();

        if use_cache {
            let keys: Vec<CacheKey> = texts.iter().map(|t| CacheKey::for_text(t)).collect();
            let entries = self.cache.load_batch(&keys).await;

            for (idx, entry) in entries.into_iter().enumerate() {
                match entry {
                    Some(entry) => slots[idx] = Some(entry.embedding),
                    None => pending.push(idx),
                }
            }

            let hits = texts.len() - pending.len();
            record_cache_lookup(&self.model, hits, pending.len());
            debug!(hits, misses = pending.len(), "Batch cache lookup");
        } else {
            pending.extend(0..texts.len());
        }

        if !pending.is_empty() {
            let pending_texts: Vec<String> = pending.iter().map(|&i| texts[i].clone()).collect();

            let vectors = self
                .request_embeddings(pending_texts)
                .await
                .map_err(|e| e.with_context("Failed to generate batch embeddings"))?;

            if use_cache {
                self.cache_fresh(texts, &pending, &vectors, metadata).await;
            }

            for (&idx, vector) in pending.iter().zip(vectors) {
                slots[idx] = Some(vector);
            }
        }

        slots
            .into_iter()
            .enumerate()
            .map(|(idx, slot)| {
                slot.ok_or_else(|| {
                    DomainError::internal(format!("No embedding produced for index {}", idx))
                })
            })
            .collect()
    }

    /// Remove every cached embedding
    pub async fn clear_cache(&self) -> Result<usize, DomainError> {
        self.cache.clear().await
    }

    pub async fn cache_info(&self) -> Result<CacheInfo, DomainError> {
        self.cache.info().await
    }

    fn validate_batch(texts: &[String], metadata: Option<&[Metadata]>) -> Result<(), DomainError> {
        if texts.is_empty() {
            return Err(DomainError::validation("Texts must be a non-empty list"));
        }

        if let Some(idx) = texts.iter().position(|t| !validate_text(t)) {
            return Err(DomainError::validation(format!(
                "Text at index {} must be a non-empty string",
                idx
            )));
        }

        if let Some(metadata) = metadata {
            if metadata.len() != texts.len() {
                return Err(DomainError::validation(format!(
                    "Metadata length ({}) must match texts length ({})",
                    metadata.len(),
                    texts.len()
                )));
            }
        }

        Ok(())
    }

    /// One provider call; the reply must carry exactly one vector per text
    async fn request_embeddings(&self, texts: Vec<String>) -> Result<Vec<Vector>, DomainError> {
        let count = texts.len();
        let request = EmbeddingRequest::new(self.model.clone(), texts);

        let result = self.provider.embed(request).await;
        record_provider_call(&self.model, count, result.is_ok());
        let response = result?;

        if response.len() != count {
            return Err(DomainError::provider(
                self.provider.provider_name(),
                format!("Expected {} embeddings, got {}", count, response.len()),
            ));
        }

        Ok(response.into_ordered_vectors())
    }

    async fn cache_fresh(
        &self,
        texts: &[String],
        pending: &[usize],
        vectors: &[Vector],
        metadata: Option<&[Metadata]>,
    ) {
        let entries: Vec<(CacheKey, Vector)> = pending
            .iter()
            .zip(vectors)
            .map(|(&idx, vector)| (CacheKey::for_text(&texts[idx]), vector.clone()))
            .collect();

        let pending_metadata: Option<Vec<Metadata>> =
            metadata.map(|m| pending.iter().map(|&idx| m[idx].clone()).collect());

        if let Err(e) = self
            .cache
            .save_batch(&entries, pending_metadata.as_deref())
            .await
        {
            warn!(count = entries.len(), "Failed to cache batch embeddings: {}", e);
        }
    }
}

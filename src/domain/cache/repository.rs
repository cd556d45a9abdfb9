//! Embedding cache trait definition

use std::fmt::Debug;

use async_trait::async_trait;

use super::{CacheEntry, CacheInfo, CacheKey, Metadata};
use crate::domain::embedding::Vector;
use crate::domain::DomainError;

/// Durable keyed storage of (vector, metadata) pairs
///
/// Reads are fail-soft: an entry that cannot be read or decoded is reported
/// as absent, never as an error.
#[async_trait]
pub trait EmbeddingCache: Send + Sync + Debug {
    /// Loads the entry for a key, `None` on miss or unreadable entry
    async fn load(&self, key: &CacheKey) -> Option<CacheEntry>;

    /// Writes an entry, replacing any previous one for the same key
    async fn save(
        &self,
        key: &CacheKey,
        embedding: &[f64],
        metadata: Option<&Metadata>,
    ) -> Result<(), DomainError>;

    /// Loads several entries, one independent lookup per key
    async fn load_batch(&self, keys: &[CacheKey]) -> Vec<Option<CacheEntry>> {
        let mut results = Vec::with_capacity(keys.len());

        for key in keys {
            results.push(self.load(key).await);
        }

        results
    }

    /// Saves several entries
    ///
    /// A metadata list whose length differs from `entries` is ignored.
    async fn save_batch(
        &self,
        entries: &[(CacheKey, Vector)],
        metadata: Option<&[Metadata]>,
    ) -> Result<(), DomainError> {
        let metadata = metadata.filter(|m| m.len() == entries.len());

        for (idx, (key, embedding)) in entries.iter().enumerate() {
            let meta = metadata.map(|m| &m[idx]);
            self.save(key, embedding, meta).await?;
        }

        Ok(())
    }

    /// Removes one entry, returning whether it existed
    async fn delete(&self, key: &CacheKey) -> Result<bool, DomainError>;

    /// Removes every entry, returning how many were removed
    async fn clear(&self) -> Result<usize, DomainError>;

    /// Returns entry count and on-disk size
    async fn info(&self) -> Result<CacheInfo, DomainError>;
}

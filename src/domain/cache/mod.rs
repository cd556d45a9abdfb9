//! Content-addressed embedding cache domain

mod entry;
mod key;
mod repository;

pub use entry::{CacheEntry, CacheInfo, Metadata};
pub use key::CacheKey;
pub use repository::EmbeddingCache;

#[cfg(test)]
pub use repository::mock::MockEmbeddingCache;

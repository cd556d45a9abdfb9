//! Domain layer - Core types, traits and validation

pub mod cache;
pub mod embedding;
pub mod error;
pub mod memory;

pub use cache::{CacheEntry, CacheInfo, CacheKey, EmbeddingCache, Metadata};
pub use embedding::{EmbeddingProvider, EmbeddingRequest, EmbeddingResponse, Vector};
pub use error::DomainError;
pub use memory::{
    EqualityFilter, MemoryRecord, NearVectorQuery, NewMemory, StoredMemory, VectorStore,
};

//! Cache infrastructure - Embedding cache implementations

mod file;

pub use file::FileEmbeddingCache;

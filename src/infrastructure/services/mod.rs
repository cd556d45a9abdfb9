//! Infrastructure services

mod embedding_router;
mod memory_service;

pub use embedding_router::EmbeddingRouter;
pub use memory_service::{MemoryService, DEFAULT_SEARCH_LIMIT};

//! Vector store implementations

mod in_memory;
mod weaviate;

pub use in_memory::InMemoryVectorStore;
pub use weaviate::{WeaviateVectorStore, DEFAULT_WEAVIATE_URL};

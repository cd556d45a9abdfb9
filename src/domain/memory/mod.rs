//! Memory domain - agent memories stored in a vector database

mod query;
mod record;
mod store;
mod validation;

pub use query::{EqualityFilter, NearVectorQuery, MEMORY_CLASS, MEMORY_FIELDS};
pub use record::{MemoryRecord, NewMemory, StoredMemory, DEFAULT_SOURCE};
pub use store::{memory_class_schema, VectorStore};
pub use validation::{validate_text, MemoryValidationError};

#[cfg(test)]
pub use store::MockVectorStore;

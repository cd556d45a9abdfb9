//! Cache entry and statistics types

use std::path::PathBuf;

use serde::Serialize;

use super::CacheKey;
use crate::domain::embedding::Vector;

/// Free-form metadata stored alongside a cached vector
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// A previously computed vector for one text
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub key: CacheKey,
    pub embedding: Vector,
    pub metadata: Metadata,
}

impl CacheEntry {
    pub fn new(key: CacheKey, embedding: Vector, metadata: Metadata) -> Self {
        Self {
            key,
            embedding,
            metadata,
        }
    }
}

/// Cache statistics
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CacheInfo {
    pub entry_count: usize,
    pub total_size_bytes: u64,
    pub cache_dir: PathBuf,
}

//! File-backed embedding cache: one JSON document per key

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::domain::cache::{CacheEntry, CacheInfo, CacheKey, EmbeddingCache, Metadata};
use crate::domain::embedding::Vector;
use crate::domain::DomainError;

const ENTRY_EXTENSION: &str = "json";

/// On-disk layout of a cache entry
#[derive(Debug, Deserialize)]
struct StoredEntry {
    embedding: Vector,
    #[serde(default)]
    metadata: Option<Metadata>,
}

#[derive(Debug, Serialize)]
struct StoredEntryRef<'a> {
    embedding: &'a [f64],
    metadata: &'a Metadata,
}

/// Embedding cache persisted as `<sha256>.json` files in a directory
///
/// Writes go through a temporary sibling file that is renamed into place, so
/// a reader never observes a partially written entry. Concurrent writers of
/// the same key are last-write-wins.
#[derive(Debug, Clone)]
pub struct FileEmbeddingCache {
    cache_dir: PathBuf,
}

impl FileEmbeddingCache {
    /// Opens a cache rooted at `cache_dir`, creating the directory tree if needed
    pub fn new(cache_dir: impl Into<PathBuf>) -> Result<Self, DomainError> {
        let cache_dir = cache_dir.into();

        std::fs::create_dir_all(&cache_dir).map_err(|e| {
            DomainError::cache(format!(
                "Failed to create cache directory {}: {}",
                cache_dir.display(),
                e
            ))
        })?;

        Ok(Self { cache_dir })
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    fn entry_path(&self, key: &CacheKey) -> PathBuf {
        self.cache_dir
            .join(format!("{}.{}", key.as_str(), ENTRY_EXTENSION))
    }

    /// Lists entry files with their sizes
    async fn entry_files(&self) -> Result<Vec<(PathBuf, u64)>, DomainError> {
        let mut dir = fs::read_dir(&self.cache_dir)
            .await
            .map_err(|e| DomainError::cache(format!("Failed to read cache directory: {}", e)))?;

        let mut files = Vec::new();

        while let Some(entry) = dir
            .next_entry()
            .await
            .map_err(|e| DomainError::cache(format!("Failed to read cache directory: {}", e)))?
        {
            let path = entry.path();

            if path.extension().and_then(|ext| ext.to_str()) != Some(ENTRY_EXTENSION) {
                continue;
            }

            match entry.metadata().await {
                Ok(meta) if meta.is_file() => files.push((path, meta.len())),
                Ok(_) => {}
                // Removed by a concurrent clear
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => {
                    return Err(DomainError::cache(format!(
                        "Failed to stat cache entry {}: {}",
                        path.display(),
                        e
                    )));
                }
            }
        }

        Ok(files)
    }
}

#[async_trait]
impl EmbeddingCache for FileEmbeddingCache {
    async fn load(&self, key: &CacheKey) -> Option<CacheEntry> {
        let path = self.entry_path(key);

        let bytes = match fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return None,
            Err(e) => {
                warn!(key = %key, error = %e, "Unreadable cache entry, treating as miss");
                return None;
            }
        };

        match serde_json::from_slice::<StoredEntry>(&bytes) {
            Ok(stored) => Some(CacheEntry::new(
                key.clone(),
                stored.embedding,
                stored.metadata.unwrap_or_default(),
            )),
            Err(e) => {
                warn!(key = %key, error = %e, "Corrupt cache entry, treating as miss");
                None
            }
        }
    }

    async fn save(
        &self,
        key: &CacheKey,
        embedding: &[f64],
        metadata: Option<&Metadata>,
    ) -> Result<(), DomainError> {
        let empty = Metadata::new();
        let document = StoredEntryRef {
            embedding,
            metadata: metadata.unwrap_or(&empty),
        };

        let data = serde_json::to_vec(&document)
            .map_err(|e| DomainError::cache(format!("Failed to serialize cache entry: {}", e)))?;

        let path = self.entry_path(key);
        let tmp_path = self
            .cache_dir
            .join(format!(".{}.{}.tmp", key.as_str(), Uuid::new_v4().simple()));

        fs::write(&tmp_path, &data)
            .await
            .map_err(|e| DomainError::cache(format!("Failed to write cache entry: {}", e)))?;

        if let Err(e) = fs::rename(&tmp_path, &path).await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(DomainError::cache(format!(
                "Failed to persist cache entry: {}",
                e
            )));
        }

        debug!(key = %key, bytes = data.len(), "Saved cache entry");
        Ok(())
    }

    async fn delete(&self, key: &CacheKey) -> Result<bool, DomainError> {
        match fs::remove_file(self.entry_path(key)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(DomainError::cache(format!(
                "Failed to delete cache entry {}: {}",
                key, e
            ))),
        }
    }

    async fn clear(&self) -> Result<usize, DomainError> {
        let mut removed = 0;

        for (path, _) in self.entry_files().await? {
            match fs::remove_file(&path).await {
                Ok(()) => removed += 1,
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => {
                    return Err(DomainError::cache(format!(
                        "Failed to delete cache entry {}: {}",
                        path.display(),
                        e
                    )));
                }
            }
        }

        debug!(removed, dir = %self.cache_dir.display(), "Cleared embedding cache");
        Ok(removed)
    }

    async fn info(&self) -> Result<CacheInfo, DomainError> {
        let files = self.entry_files().await?;

        Ok(CacheInfo {
            entry_count: files.len(),
            total_size_bytes: files.iter().map(|(_, size)| size).sum(),
            cache_dir: self.cache_dir.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn create_cache() -> (TempDir, FileEmbeddingCache) {
        let dir = TempDir::new().unwrap();
        let cache = FileEmbeddingCache::new(dir.path().join("embeddings")).unwrap();
        (dir, cache)
    }

    fn metadata(pairs: &[(&str, serde_json::Value)]) -> Metadata {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_creates_nested_directory() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("a").join("b").join("c");

        let cache = FileEmbeddingCache::new(&nested).unwrap();

        assert!(nested.is_dir());
        assert_eq!(cache.cache_dir(), nested.as_path());
    }

    #[test]
    fn test_existing_directory_is_reused() {
        let dir = TempDir::new().unwrap();

        assert!(FileEmbeddingCache::new(dir.path()).is_ok());
        assert!(FileEmbeddingCache::new(dir.path()).is_ok());
    }

    #[tokio::test]
    async fn test_save_and_load_round_trip() {
        let (_dir, cache) = create_cache();
        let key = CacheKey::for_text("round trip");
        let vector = vec![0.1, -0.000123456789012345, 1e-300, 0.30000000000000004, 2.0];
        let meta = metadata(&[("source", json!("test")), ("timestamp", json!("2024-03-20"))]);

        cache.save(&key, &vector, Some(&meta)).await.unwrap();
        let entry = cache.load(&key).await.unwrap();

        assert_eq!(entry.key, key);
        assert_eq!(entry.embedding, vector);
        assert_eq!(entry.metadata, meta);
    }

    #[tokio::test]
    async fn test_save_defaults_metadata_to_empty_object() {
        let (_dir, cache) = create_cache();
        let key = CacheKey::for_text("no metadata");

        cache.save(&key, &[1.0, 2.0], None).await.unwrap();

        let raw = std::fs::read_to_string(cache.entry_path(&key)).unwrap();
        let document: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(document, json!({"embedding": [1.0, 2.0], "metadata": {}}));
        assert!(cache.load(&key).await.unwrap().metadata.is_empty());
    }

    #[tokio::test]
    async fn test_save_overwrites_previous_entry() {
        let (_dir, cache) = create_cache();
        let key = CacheKey::for_text("rewrite");

        cache.save(&key, &[1.0], Some(&metadata(&[("v", json!(1))]))).await.unwrap();
        cache.save(&key, &[2.0], None).await.unwrap();

        let entry = cache.load(&key).await.unwrap();
        assert_eq!(entry.embedding, vec![2.0]);
        assert!(entry.metadata.is_empty());
        assert_eq!(cache.info().await.unwrap().entry_count, 1);
    }

    #[tokio::test]
    async fn test_load_missing_is_none() {
        let (_dir, cache) = create_cache();
        assert!(cache.load(&CacheKey::for_text("never saved")).await.is_none());
    }

    #[tokio::test]
    async fn test_corrupt_entry_is_a_miss() {
        let (_dir, cache) = create_cache();
        let key = CacheKey::for_text("corrupt");
        std::fs::write(cache.entry_path(&key), b"{not json").unwrap();

        assert!(cache.load(&key).await.is_none());
    }

    #[tokio::test]
    async fn test_entry_without_embedding_is_a_miss() {
        let (_dir, cache) = create_cache();
        let key = CacheKey::for_text("no embedding");
        std::fs::write(cache.entry_path(&key), br#"{"metadata": {"a": 1}}"#).unwrap();

        assert!(cache.load(&key).await.is_none());
    }

    #[tokio::test]
    async fn test_entry_with_non_numeric_embedding_is_a_miss() {
        let (_dir, cache) = create_cache();
        let key = CacheKey::for_text("strings");
        std::fs::write(
            cache.entry_path(&key),
            br#"{"embedding": ["a", "b"], "metadata": {}}"#,
        )
        .unwrap();

        assert!(cache.load(&key).await.is_none());
    }

    #[tokio::test]
    async fn test_entry_without_metadata_still_loads() {
        let (_dir, cache) = create_cache();
        let key = CacheKey::for_text("legacy");
        std::fs::write(cache.entry_path(&key), br#"{"embedding": [0.5, 1]}"#).unwrap();

        let entry = cache.load(&key).await.unwrap();
        assert_eq!(entry.embedding, vec![0.5, 1.0]);
        assert!(entry.metadata.is_empty());
    }

    #[tokio::test]
    async fn test_load_batch_isolates_corrupt_entries() {
        let (_dir, cache) = create_cache();
        let good = CacheKey::for_text("good");
        let bad = CacheKey::for_text("bad");
        let missing = CacheKey::for_text("missing");

        cache.save(&good, &[1.0], None).await.unwrap();
        std::fs::write(cache.entry_path(&bad), b"garbage").unwrap();

        let results = cache
            .load_batch(&[bad.clone(), good.clone(), missing.clone()])
            .await;

        assert_eq!(results.len(), 3);
        assert!(results[0].is_none());
        assert_eq!(results[1].as_ref().unwrap().embedding, vec![1.0]);
        assert!(results[2].is_none());
    }

    #[tokio::test]
    async fn test_delete() {
        let (_dir, cache) = create_cache();
        let key = CacheKey::for_text("delete me");
        cache.save(&key, &[1.0], None).await.unwrap();

        assert!(cache.delete(&key).await.unwrap());
        assert!(!cache.delete(&key).await.unwrap());
        assert!(cache.load(&key).await.is_none());
    }

    #[tokio::test]
    async fn test_info_and_clear() {
        let (_dir, cache) = create_cache();
        cache.save(&CacheKey::for_text("a"), &[1.0, 2.0], None).await.unwrap();
        cache.save(&CacheKey::for_text("b"), &[3.0], None).await.unwrap();
        std::fs::write(cache.cache_dir().join("notes.txt"), b"not an entry").unwrap();

        let info = cache.info().await.unwrap();
        let expected_size: u64 = ["a", "b"]
            .iter()
            .map(|t| {
                std::fs::metadata(cache.entry_path(&CacheKey::for_text(t)))
                    .unwrap()
                    .len()
            })
            .sum();

        assert_eq!(info.entry_count, 2);
        assert_eq!(info.total_size_bytes, expected_size);
        assert_eq!(info.cache_dir, cache.cache_dir());

        assert_eq!(cache.clear().await.unwrap(), 2);

        let info = cache.info().await.unwrap();
        assert_eq!(info.entry_count, 0);
        assert_eq!(info.total_size_bytes, 0);
        assert!(cache.cache_dir().join("notes.txt").exists());
    }

    #[tokio::test]
    async fn test_entries_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let key = CacheKey::for_text("persistent");

        FileEmbeddingCache::new(dir.path())
            .unwrap()
            .save(&key, &[4.0, 5.0], None)
            .await
            .unwrap();

        let reopened = FileEmbeddingCache::new(dir.path()).unwrap();
        assert_eq!(reopened.load(&key).await.unwrap().embedding, vec![4.0, 5.0]);
    }
}

//! Memory service - write and search agent memories in a vector store

use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use super::EmbeddingRouter;
use crate::domain::memory::{
    memory_class_schema, EqualityFilter, NearVectorQuery, NewMemory, StoredMemory, VectorStore,
};
use crate::domain::DomainError;
use crate::infrastructure::observability::record_memory_write;

/// Number of hits returned when the caller does not choose a limit
pub const DEFAULT_SEARCH_LIMIT: usize = 5;

/// Validates memories, embeds them through the router and persists them
pub struct MemoryService {
    router: Arc<EmbeddingRouter>,
    store: Arc<dyn VectorStore>,
    class_name: String,
}

impl std::fmt::Debug for MemoryService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryService")
            .field("class_name", &self.class_name)
            .field("model", &self.router.model())
            .finish()
    }
}

impl MemoryService {
    pub fn new(
        router: Arc<EmbeddingRouter>,
        store: Arc<dyn VectorStore>,
        class_name: impl Into<String>,
    ) -> Self {
        Self {
            router,
            store,
            class_name: class_name.into(),
        }
    }

    pub fn router(&self) -> &EmbeddingRouter {
        &self.router
    }

    /// Write one memory, returning the id assigned by the store
    #[instrument(skip(self, memory), fields(project = %memory.project, agent = %memory.agent))]
    pub async fn write_one(&self, memory: NewMemory) -> Result<String, DomainError> {
        memory.validate()?;

        let vector = self.router.get_embedding(&memory.content, true, None).await?;
        let record = memory.into_record(Utc::now());

        let id = self
            .store
            .create_object(&self.class_name, record.to_properties(), vector)
            .await
            .map_err(|e| {
                record_memory_write(1, false);
                DomainError::write(format!("Failed to write memory: {}", e))
            })?;

        record_memory_write(1, true);
        info!(id = %id, "Memory written");

        Ok(id)
    }

    /// Write several memories with one batch embedding lookup
    ///
    /// Every record is validated before anything is embedded. Records are
    /// written in input order; a store failure stops the batch and the ids
    /// written so far are carried in the returned error.
    #[instrument(skip(self, memories), fields(count = memories.len()))]
    pub async fn write_batch(&self, memories: Vec<NewMemory>) -> Result<Vec<String>, DomainError> {
        if memories.is_empty() {
            return Err(DomainError::validation("Memories must be a non-empty list"));
        }

        for (idx, memory) in memories.iter().enumerate() {
            memory.validate().map_err(|e| e.at_index(idx))?;
        }

        let contents: Vec<String> = memories.iter().map(|m| m.content.clone()).collect();
        let vectors = self
            .router
            .get_embeddings(&contents, true, None)
            .await
            .map_err(|e| {
                DomainError::batch(format!("Failed to embed memories: {}", e), Vec::new())
            })?;

        let mut ids = Vec::with_capacity(memories.len());

        for (idx, (memory, vector)) in memories.into_iter().zip(vectors).enumerate() {
            let record = memory.into_record(Utc::now());

            match self
                .store
                .create_object(&self.class_name, record.to_properties(), vector)
                .await
            {
                Ok(id) => ids.push(id),
                Err(e) => {
                    record_memory_write(ids.len(), true);
                    record_memory_write(1, false);
                    warn!(index = idx, written = ids.len(), "Batch write stopped: {}", e);

                    return Err(DomainError::batch(
                        format!("Failed to write memory at index {}: {}", idx, e),
                        ids,
                    ));
                }
            }
        }

        record_memory_write(ids.len(), true);
        info!(count = ids.len(), "Memory batch written");

        Ok(ids)
    }

    /// Write untyped records, e.g. the elements of a JSON array
    pub async fn write_batch_values(&self, values: &[Value]) -> Result<Vec<String>, DomainError> {
        let memories = values
            .iter()
            .enumerate()
            .map(|(idx, value)| NewMemory::from_value(idx, value))
            .collect::<Result<Vec<_>, _>>()?;

        self.write_batch(memories).await
    }

    /// Memories closest to `query`, optionally restricted to one project
    ///
    /// An empty project means no filter. Missing or malformed store responses
    /// yield an empty list.
    #[instrument(skip(self, query))]
    pub async fn search(
        &self,
        query: &str,
        project: Option<&str>,
        limit: usize,
    ) -> Result<Vec<StoredMemory>, DomainError> {
        if limit == 0 {
            return Err(DomainError::validation("limit must be at least 1"));
        }

        let vector = self.router.get_embedding(query, true, None).await?;

        let mut near = NearVectorQuery::new(self.class_name.clone(), vector, limit);
        if let Some(project) = project.filter(|p| !p.is_empty()) {
            near = near.with_filter(EqualityFilter::new("project", project));
        }

        let response = self.store.near_vector(near).await?;
        let hits = self.parse_hits(&response);

        debug!(hits = hits.len(), "Memory search complete");
        Ok(hits)
    }

    /// Create the memory class unless it already exists
    ///
    /// Returns `true` when the class was created.
    #[instrument(skip(self))]
    pub async fn init_schema(&self) -> Result<bool, DomainError> {
        if self.store.class_exists(&self.class_name).await? {
            debug!(class = %self.class_name, "Schema already present");
            return Ok(false);
        }

        self.store
            .create_class(memory_class_schema(&self.class_name))
            .await?;

        info!(class = %self.class_name, "Schema created");
        Ok(true)
    }

    fn parse_hits(&self, response: &Value) -> Vec<StoredMemory> {
        let Some(hits) = response
            .get("data")
            .and_then(|data| data.get("Get"))
            .and_then(|get| get.get(&self.class_name))
            .and_then(Value::as_array)
        else {
            debug!("Search response carried no results");
            return Vec::new();
        };

        hits.iter()
            .filter_map(|hit| match serde_json::from_value(hit.clone()) {
                Ok(memory) => Some(memory),
                Err(e) => {
                    warn!("Skipping malformed search hit: {}", e);
                    None
                }
            })
            .collect()
    }
}

//! In-memory vector store for development and testing

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::embedding::{cosine_similarity, Vector};
use crate::domain::memory::{NearVectorQuery, VectorStore};
use crate::domain::DomainError;

#[derive(Debug, Clone)]
struct StoredObject {
    id: String,
    class_name: String,
    properties: Value,
    vector: Vector,
}

/// Vector store kept in process memory, ranked by cosine similarity
///
/// Responses use the same document shape as the Weaviate adapter.
#[derive(Debug, Default)]
pub struct InMemoryVectorStore {
    objects: Arc<RwLock<Vec<StoredObject>>>,
    classes: Arc<RwLock<HashSet<String>>>,
}

impl InMemoryVectorStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn object_count(&self) -> usize {
        self.objects.read().await.len()
    }

    /// Properties of a stored object by id
    pub async fn properties(&self, id: &str) -> Option<Value> {
        self.objects
            .read()
            .await
            .iter()
            .find(|obj| obj.id == id)
            .map(|obj| obj.properties.clone())
    }
}

fn project_fields(properties: &Value, fields: &[String]) -> Value {
    let mut projected = Map::new();

    for field in fields {
        if let Some(value) = properties.get(field) {
            projected.insert(field.clone(), value.clone());
        }
    }

    Value::Object(projected)
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn create_object(
        &self,
        class_name: &str,
        properties: Value,
        vector: Vector,
    ) -> Result<String, DomainError> {
        if !properties.is_object() {
            return Err(DomainError::vector_store("Object properties must be a map"));
        }

        let id = Uuid::new_v4().to_string();

        self.objects.write().await.push(StoredObject {
            id: id.clone(),
            class_name: class_name.to_string(),
            properties,
            vector,
        });

        Ok(id)
    }

    async fn near_vector(&self, query: NearVectorQuery) -> Result<Value, DomainError> {
        let objects = self.objects.read().await;

        let mut scored: Vec<(f64, &StoredObject)> = objects
            .iter()
            .filter(|obj| obj.class_name == query.class_name)
            .filter(|obj| {
                query
                    .filter
                    .as_ref()
                    .is_none_or(|filter| filter.matches(&obj.properties))
            })
            .map(|obj| (cosine_similarity(&query.vector, &obj.vector), obj))
            .collect();

        scored.sort_by(|a, b| b.0.total_cmp(&a.0));

        let hits: Vec<Value> = scored
            .into_iter()
            .take(query.limit)
            .map(|(_, obj)| project_fields(&obj.properties, &query.fields))
            .collect();

        Ok(json!({ "data": { "Get": { query.class_name.clone(): hits } } }))
    }

    async fn class_exists(&self, class_name: &str) -> Result<bool, DomainError> {
        Ok(self.classes.read().await.contains(class_name))
    }

    async fn create_class(&self, schema: Value) -> Result<(), DomainError> {
        let class_name = schema
            .get("class")
            .and_then(Value::as_str)
            .ok_or_else(|| DomainError::validation("Schema is missing a class name"))?;

        self.classes.write().await.insert(class_name.to_string());
        Ok(())
    }
}

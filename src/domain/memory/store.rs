//! Vector store trait

use async_trait::async_trait;
use serde_json::{json, Value};

use super::NearVectorQuery;
use crate::domain::embedding::Vector;
use crate::domain::error::DomainError;

#[cfg(test)]
use mockall::automock;

/// External vector database holding memory objects
#[cfg_attr(test, automock)]
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Creates an object with its vector, returning the store-assigned id
    async fn create_object(
        &self,
        class_name: &str,
        properties: Value,
        vector: Vector,
    ) -> Result<String, DomainError>;

    /// Runs a nearest-neighbour query and returns the raw response document
    ///
    /// The document follows the `{"data": {"Get": {<class>: [...]}}}` shape;
    /// callers treat any other shape as an empty result.
    async fn near_vector(&self, query: NearVectorQuery) -> Result<Value, DomainError>;

    /// Checks whether a class is defined in the schema
    async fn class_exists(&self, class_name: &str) -> Result<bool, DomainError>;

    /// Defines a class from its schema document
    async fn create_class(&self, schema: Value) -> Result<(), DomainError>;
}

/// Schema document for the memory class
pub fn memory_class_schema(class_name: &str) -> Value {
    json!({
        "class": class_name,
        "description": "Long-term semantic memory for all AI agents and projects.",
        "properties": [
            {"name": "content", "dataType": ["text"]},
            {"name": "project", "dataType": ["string"]},
            {"name": "repo", "dataType": ["string"]},
            {"name": "agent", "dataType": ["string"]},
            {"name": "tags", "dataType": ["string[]"]},
            {"name": "source", "dataType": ["string"]},
            {"name": "timestamp", "dataType": ["date"]}
        ]
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_class_schema() {
        let schema = memory_class_schema("ProjectMemory");

        assert_eq!(schema["class"], "ProjectMemory");
        assert_eq!(schema["properties"].as_array().unwrap().len(), 7);
        assert_eq!(schema["properties"][4]["dataType"], json!(["string[]"]));
    }
}

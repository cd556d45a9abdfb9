//! Nearest-neighbour query description

use serde_json::{json, Value};

use crate::domain::embedding::Vector;

/// Vector store class holding memory objects
pub const MEMORY_CLASS: &str = "ProjectMemory";

/// Properties requested for every search hit
pub const MEMORY_FIELDS: &[&str] = &[
    "content",
    "project",
    "repo",
    "agent",
    "tags",
    "source",
    "timestamp",
];

/// Exact-match equality on one string property
#[derive(Debug, Clone, PartialEq)]
pub struct EqualityFilter {
    pub path: String,
    pub value: String,
}

impl EqualityFilter {
    pub fn new(path: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            value: value.into(),
        }
    }

    /// Renders the filter as a where-clause document
    pub fn to_where(&self) -> Value {
        json!({
            "path": [self.path],
            "operator": "Equal",
            "valueString": self.value,
        })
    }

    /// Whether a property document satisfies the filter
    pub fn matches(&self, properties: &Value) -> bool {
        properties.get(&self.path).and_then(Value::as_str) == Some(self.value.as_str())
    }
}

/// Similarity search against a vector store class
#[derive(Debug, Clone, PartialEq)]
pub struct NearVectorQuery {
    pub class_name: String,
    pub fields: Vec<String>,
    pub vector: Vector,
    pub filter: Option<EqualityFilter>,
    pub limit: usize,
}

impl NearVectorQuery {
    pub fn new(class_name: impl Into<String>, vector: Vector, limit: usize) -> Self {
        Self {
            class_name: class_name.into(),
            fields: MEMORY_FIELDS.iter().map(|f| f.to_string()).collect(),
            vector,
            filter: None,
            limit,
        }
    }

    pub fn with_filter(mut self, filter: EqualityFilter) -> Self {
        self.filter = Some(filter);
        self
    }
}

//! Embedding request types

use serde::{Deserialize, Serialize};

/// Request to embed an ordered batch of texts with one model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingRequest {
    model: String,
    input: Vec<String>,
}

impl EmbeddingRequest {
    /// Create a request for multiple texts
    pub fn new(model: impl Into<String>, input: Vec<String>) -> Self {
        Self {
            model: model.into(),
            input,
        }
    }

    /// Create a request for a single text
    pub fn single(model: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(model, vec![text.into()])
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Texts in request order
    pub fn inputs(&self) -> &[String] {
        &self.input
    }

    pub fn len(&self) -> usize {
        self.input.len()
    }

    pub fn is_empty(&self) -> bool {
        self.input.is_empty()
    }
}

//! Embedding response types

use serde::{Deserialize, Serialize};

/// Embedding vector as returned by the provider and persisted in the cache
pub type Vector = Vec<f64>;

/// A single embedding vector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Embedding {
    /// Index of the input text this vector belongs to
    index: usize,
    embedding: Vector,
}

impl Embedding {
    pub fn new(index: usize, embedding: Vector) -> Self {
        Self { index, embedding }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn vector(&self) -> &[f64] {
        &self.embedding
    }

    pub fn dimensions(&self) -> usize {
        self.embedding.len()
    }

    pub fn into_vector(self) -> Vector {
        self.embedding
    }
}

/// Calculate cosine similarity between two vectors
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f64 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f64 = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let norm_b: f64 = b.iter().map(|x| x * x).sum::<f64>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

/// Usage statistics for embedding request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingUsage {
    prompt_tokens: u32,
    total_tokens: u32,
}

impl EmbeddingUsage {
    pub fn new(prompt_tokens: u32, total_tokens: u32) -> Self {
        Self {
            prompt_tokens,
            total_tokens,
        }
    }

    pub fn prompt_tokens(&self) -> u32 {
        self.prompt_tokens
    }

    pub fn total_tokens(&self) -> u32 {
        self.total_tokens
    }
}

/// Response from an embedding request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingResponse {
    model: String,
    data: Vec<Embedding>,
    usage: EmbeddingUsage,
}

impl EmbeddingResponse {
    pub fn new(model: String, data: Vec<Embedding>, usage: EmbeddingUsage) -> Self {
        Self { model, data, usage }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn embeddings(&self) -> &[Embedding] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn usage(&self) -> &EmbeddingUsage {
        &self.usage
    }

    /// Consume the response and return vectors ordered by their input index
    pub fn into_ordered_vectors(self) -> Vec<Vector> {
        let mut data = self.data;
        data.sort_by_key(Embedding::index);
        data.into_iter().map(Embedding::into_vector).collect()
    }
}

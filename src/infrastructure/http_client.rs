//! JSON-over-HTTP client shared by the embedding and vector store adapters

use std::time::Duration;

use async_trait::async_trait;

use crate::domain::DomainError;

/// Trait for HTTP client operations (for mocking)
#[async_trait]
pub trait HttpClientTrait: Send + Sync + std::fmt::Debug {
    async fn post_json(
        &self,
        url: &str,
        headers: Vec<(&str, &str)>,
        body: &serde_json::Value,
    ) -> Result<serde_json::Value, DomainError>;

    /// GET returning `None` on 404
    async fn get_json(
        &self,
        url: &str,
        headers: Vec<(&str, &str)>,
    ) -> Result<Option<serde_json::Value>, DomainError>;
}

/// Real HTTP client using reqwest
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
}

impl HttpClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, DomainError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DomainError::configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client })
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

async fn error_for_status(response: reqwest::Response) -> Result<reqwest::Response, DomainError> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status();
    let error_body = response.text().await.unwrap_or_default();
    Err(DomainError::provider(
        "http",
        format!("HTTP {}: {}", status, error_body),
    ))
}

#[async_trait]
impl HttpClientTrait for HttpClient {
    async fn post_json(
        &self,
        url: &str,
        headers: Vec<(&str, &str)>,
        body: &serde_json::Value,
    ) -> Result<serde_json::Value, DomainError> {
        let mut request = self.client.post(url);

        for (key, value) in headers {
            request = request.header(key, value);
        }

        let response = request
            .json(body)
            .send()
            .await
            .map_err(|e| DomainError::provider("http", format!("Request failed: {}", e)))?;

        error_for_status(response)
            .await?
            .json()
            .await
            .map_err(|e| DomainError::provider("http", format!("Failed to parse response: {}", e)))
    }

    async fn get_json(
        &self,
        url: &str,
        headers: Vec<(&str, &str)>,
    ) -> Result<Option<serde_json::Value>, DomainError> {
        let mut request = self.client.get(url);

        for (key, value) in headers {
            request = request.header(key, value);
        }

        let response = request
            .send()
            .await
            .map_err(|e| DomainError::provider("http", format!("Request failed: {}", e)))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        error_for_status(response)
            .await?
            .json()
            .await
            .map(Some)
            .map_err(|e| DomainError::provider("http", format!("Failed to parse response: {}", e)))
    }
}

//! Weaviate vector store over its REST and GraphQL endpoints

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::domain::embedding::Vector;
use crate::domain::memory::{NearVectorQuery, VectorStore};
use crate::domain::DomainError;
use crate::infrastructure::http_client::HttpClientTrait;

pub const DEFAULT_WEAVIATE_URL: &str = "http://localhost:8080";

/// Weaviate client speaking the v1 REST API
#[derive(Debug)]
pub struct WeaviateVectorStore<C: HttpClientTrait> {
    client: C,
    base_url: String,
}

impl<C: HttpClientTrait> WeaviateVectorStore<C> {
    pub fn new(client: C, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/v1/{}", self.base_url, path)
    }

    fn headers() -> Vec<(&'static str, &'static str)> {
        vec![("Content-Type", "application/json")]
    }
}

fn store_error(context: &str, error: DomainError) -> DomainError {
    match error {
        DomainError::Provider { message, .. } => {
            DomainError::vector_store(format!("{}: {}", context, message))
        }
        other => other,
    }
}

/// Class names are interpolated into GraphQL, so only identifiers are allowed
fn validate_class_name(class_name: &str) -> Result<(), DomainError> {
    let mut chars = class_name.chars();
    let valid = chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');

    if valid {
        Ok(())
    } else {
        Err(DomainError::validation(format!(
            "Invalid class name '{}'",
            class_name
        )))
    }
}

/// Renders a near-vector search as a GraphQL `Get` query
pub(crate) fn build_graphql_query(query: &NearVectorQuery) -> Result<String, DomainError> {
    validate_class_name(&query.class_name)?;

    for field in &query.fields {
        validate_class_name(field)?;
    }

    let vector = serde_json::to_string(&query.vector)
        .map_err(|e| DomainError::internal(format!("Failed to serialize vector: {}", e)))?;

    let mut arguments = vec![format!("nearVector: {{vector: {}}}", vector)];

    if let Some(filter) = &query.filter {
        validate_class_name(&filter.path)?;
        let value = serde_json::to_string(&filter.value)
            .map_err(|e| DomainError::internal(format!("Failed to serialize filter: {}", e)))?;
        arguments.push(format!(
            "where: {{path: [\"{}\"], operator: Equal, valueString: {}}}",
            filter.path, value
        ));
    }

    arguments.push(format!("limit: {}", query.limit));

    Ok(format!(
        "{{ Get {{ {}({}) {{ {} }} }} }}",
        query.class_name,
        arguments.join(", "),
        query.fields.join(" ")
    ))
}

#[async_trait]
impl<C: HttpClientTrait> VectorStore for WeaviateVectorStore<C> {
    async fn create_object(
        &self,
        class_name: &str,
        properties: Value,
        vector: Vector,
    ) -> Result<String, DomainError> {
        let body = json!({
            "class": class_name,
            "properties": properties,
            "vector": vector,
        });

        let response = self
            .client
            .post_json(&self.url("objects"), Self::headers(), &body)
            .await
            .map_err(|e| store_error("Failed to create object", e))?;

        let id = response
            .get("id")
            .and_then(Value::as_str)
            .ok_or_else(|| DomainError::vector_store("Create response did not include an id"))?;

        debug!(class = class_name, id, "Created vector store object");
        Ok(id.to_string())
    }

    async fn near_vector(&self, query: NearVectorQuery) -> Result<Value, DomainError> {
        let graphql = build_graphql_query(&query)?;

        let response = self
            .client
            .post_json(&self.url("graphql"), Self::headers(), &json!({ "query": graphql }))
            .await
            .map_err(|e| store_error("Near-vector query failed", e))?;

        if let Some(errors) = response.get("errors") {
            warn!(class = %query.class_name, errors = %errors, "Vector store reported query errors");
        }

        Ok(response)
    }

    async fn class_exists(&self, class_name: &str) -> Result<bool, DomainError> {
        validate_class_name(class_name)?;

        let response = self
            .client
            .get_json(&self.url(&format!("schema/{}", class_name)), Self::headers())
            .await
            .map_err(|e| store_error("Failed to read schema", e))?;

        Ok(response.is_some())
    }

    async fn create_class(&self, schema: Value) -> Result<(), DomainError> {
        self.client
            .post_json(&self.url("schema"), Self::headers(), &schema)
            .await
            .map_err(|e| store_error("Failed to create class", e))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::memory::{memory_class_schema, EqualityFilter, MEMORY_CLASS};
    use crate::infrastructure::http_client::mock::MockHttpClient;
    use crate::infrastructure::http_client::HttpClient;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_graphql_query_without_filter() {
        let query = NearVectorQuery::new(MEMORY_CLASS, vec![0.5, -1.0], 5);

        assert_eq!(
            build_graphql_query(&query).unwrap(),
            "{ Get { ProjectMemory(nearVector: {vector: [0.5,-1.0]}, limit: 5) \
             { content project repo agent tags source timestamp } } }"
        );
    }

    #[test]
    fn test_graphql_query_with_filter_escapes_value() {
        let query = NearVectorQuery::new(MEMORY_CLASS, vec![1.0], 3)
            .with_filter(EqualityFilter::new("project", "say \"hi\""));

        let graphql = build_graphql_query(&query).unwrap();

        assert!(graphql.contains(
            r#"where: {path: ["project"], operator: Equal, valueString: "say \"hi\""}"#
        ));
        assert!(graphql.contains("limit: 3"));
    }

    #[test]
    fn test_graphql_query_rejects_bad_class_name() {
        let query = NearVectorQuery::new("Project Memory) {", vec![1.0], 3);
        assert!(build_graphql_query(&query).unwrap_err().is_validation());
    }

    #[tokio::test]
    async fn test_create_object_returns_id() {
        let client = MockHttpClient::new().with_response(
            "http://localhost:8080/v1/objects",
            json!({"id": "2f6b5a4e-0000-4000-8000-000000000001", "class": "ProjectMemory"}),
        );
        let store = WeaviateVectorStore::new(client, DEFAULT_WEAVIATE_URL);

        let id = store
            .create_object(MEMORY_CLASS, json!({"content": "c"}), vec![0.1, 0.2])
            .await
            .unwrap();

        assert_eq!(id, "2f6b5a4e-0000-4000-8000-000000000001");
        let requests = store.client.requests();
        assert_eq!(requests[0].1["class"], "ProjectMemory");
        assert_eq!(requests[0].1["vector"], json!([0.1, 0.2]));
    }

    #[tokio::test]
    async fn test_create_object_failure_is_store_error() {
        let client = MockHttpClient::new()
            .with_error("http://localhost:8080/v1/objects", "HTTP 422: invalid object");
        let store = WeaviateVectorStore::new(client, DEFAULT_WEAVIATE_URL);

        let err = store
            .create_object(MEMORY_CLASS, json!({}), vec![])
            .await
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "Vector store error: Failed to create object: HTTP 422: invalid object"
        );
    }

    #[tokio::test]
    async fn test_create_object_without_id_is_store_error() {
        let client =
            MockHttpClient::new().with_response("http://localhost:8080/v1/objects", json!({}));
        let store = WeaviateVectorStore::new(client, DEFAULT_WEAVIATE_URL);

        let err = store
            .create_object(MEMORY_CLASS, json!({}), vec![])
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::VectorStore { .. }));
    }

    #[tokio::test]
    async fn test_near_vector_over_http() {
        let server = MockServer::start().await;
        let body = json!({"data": {"Get": {"ProjectMemory": [{"content": "semantic loop"}]}}});
        Mock::given(method("POST"))
            .and(path("/v1/graphql"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body.clone()))
            .expect(1)
            .mount(&server)
            .await;

        let store = WeaviateVectorStore::new(HttpClient::new(), server.uri());
        let response = store
            .near_vector(NearVectorQuery::new(MEMORY_CLASS, vec![0.1], 5))
            .await
            .unwrap();

        assert_eq!(response, body);
    }

    #[tokio::test]
    async fn test_schema_round_trip_over_http() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/schema/ProjectMemory"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v1/schema"))
            .and(body_partial_json(json!({"class": "ProjectMemory"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"class": "ProjectMemory"})))
            .expect(1)
            .mount(&server)
            .await;

        let store = WeaviateVectorStore::new(HttpClient::new(), server.uri());

        assert!(!store.class_exists(MEMORY_CLASS).await.unwrap());
        store
            .create_class(memory_class_schema(MEMORY_CLASS))
            .await
            .unwrap();
    }
}

//! Memory record types

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::validation::{validate_required, MemoryValidationError};

/// Source recorded when the caller does not provide one
pub const DEFAULT_SOURCE: &str = "agent";

fn default_source() -> String {
    DEFAULT_SOURCE.to_string()
}

/// A memory as supplied by a caller, before embedding and timestamping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewMemory {
    pub content: String,
    pub project: String,
    pub repo: String,
    pub agent: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default = "default_source")]
    pub source: String,
}

impl NewMemory {
    pub fn new(
        content: impl Into<String>,
        project: impl Into<String>,
        repo: impl Into<String>,
        agent: impl Into<String>,
    ) -> Self {
        Self {
            content: content.into(),
            project: project.into(),
            repo: repo.into(),
            agent: agent.into(),
            tags: Vec::new(),
            source: default_source(),
        }
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    /// Checks every required field, reporting the first that is invalid
    pub fn validate(&self) -> Result<(), MemoryValidationError> {
        validate_required("content", &self.content)?;
        validate_required("project", &self.project)?;
        validate_required("repo", &self.repo)?;
        validate_required("agent", &self.agent)?;
        Ok(())
    }

    /// Stamps the memory with its creation time
    pub fn into_record(self, created_at: DateTime<Utc>) -> MemoryRecord {
        MemoryRecord {
            content: self.content,
            project: self.project,
            repo: self.repo,
            agent: self.agent,
            tags: self.tags,
            source: self.source,
            timestamp: created_at.to_rfc3339_opts(SecondsFormat::Micros, true),
        }
    }
}

/// The properties persisted for a memory object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryRecord {
    pub content: String,
    pub project: String,
    pub repo: String,
    pub agent: String,
    pub tags: Vec<String>,
    pub source: String,
    pub timestamp: String,
}

impl MemoryRecord {
    pub fn to_properties(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

/// A memory returned from similarity search
///
/// Every field is optional on the wire; whatever the store omits is left at
/// its default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoredMemory {
    #[serde(deserialize_with = "null_as_default")]
    pub content: String,
    #[serde(deserialize_with = "null_as_default")]
    pub project: String,
    #[serde(deserialize_with = "null_as_default")]
    pub repo: String,
    #[serde(deserialize_with = "null_as_default")]
    pub agent: String,
    #[serde(deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub source: String,
    #[serde(deserialize_with = "null_as_default")]
    pub timestamp: String,
}

// Unset properties come back as null
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_new_memory_defaults() {
        let memory = NewMemory::new("Fixed bug", "proj", "repo", "assistant");

        assert_eq!(memory.source, "agent");
        assert!(memory.tags.is_empty());
        assert!(memory.validate().is_ok());
    }

    #[test]
    fn test_deserialize_applies_defaults() {
        let memory: NewMemory = serde_json::from_value(serde_json::json!({
            "content": "Implemented feature A",
            "project": "my-project",
            "repo": "main-repo",
            "agent": "assistant"
        }))
        .unwrap();

        assert_eq!(memory.source, DEFAULT_SOURCE);
        assert!(memory.tags.is_empty());
    }

    #[test]
    fn test_validate_reports_first_invalid_field() {
        let memory = NewMemory::new("content", "", "", "agent");

        assert_eq!(
            memory.validate(),
            Err(MemoryValidationError::EmptyField { field: "project" })
        );
    }

    #[test]
    fn test_into_record_timestamp_is_utc_iso8601() {
        let created_at = Utc.with_ymd_and_hms(2024, 3, 20, 12, 30, 0).unwrap();
        let record = NewMemory::new("c", "p", "r", "a")
            .with_tags(vec!["feature".into()])
            .with_source("user")
            .into_record(created_at);

        assert_eq!(record.timestamp, "2024-03-20T12:30:00.000000Z");
        assert_eq!(record.source, "user");

        let properties = record.to_properties();
        assert_eq!(properties["tags"], serde_json::json!(["feature"]));
        assert_eq!(properties["project"], "p");
    }

    #[test]
    fn test_stored_memory_tolerates_missing_fields() {
        let memory: StoredMemory =
            serde_json::from_value(serde_json::json!({"content": "only content"})).unwrap();

        assert_eq!(memory.content, "only content");
        assert!(memory.tags.is_empty());
    }

    #[test]
    fn test_stored_memory_null_properties_default() {
        let memory: StoredMemory = serde_json::from_value(serde_json::json!({
            "content": "c",
            "tags": null,
            "source": null
        }))
        .unwrap();

        assert!(memory.tags.is_empty());
        assert_eq!(memory.source, "");
    }
}

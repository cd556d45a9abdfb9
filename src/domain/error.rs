use thiserror::Error;

/// Core domain errors
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Provider error: {provider} - {message}")]
    Provider { provider: String, message: String },

    #[error("Write error: {message}")]
    Write { message: String },

    #[error("Batch error: {message} ({} record(s) already written)", .written_ids.len())]
    Batch {
        message: String,
        written_ids: Vec<String>,
    },

    #[error("Vector store error: {message}")]
    VectorStore { message: String },

    #[error("Cache error: {message}")]
    Cache { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DomainError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub fn write(message: impl Into<String>) -> Self {
        Self::Write {
            message: message.into(),
        }
    }

    pub fn batch(message: impl Into<String>, written_ids: Vec<String>) -> Self {
        Self::Batch {
            message: message.into(),
            written_ids,
        }
    }

    pub fn vector_store(message: impl Into<String>) -> Self {
        Self::VectorStore {
            message: message.into(),
        }
    }

    pub fn cache(message: impl Into<String>) -> Self {
        Self::Cache {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Re-wrap a provider error with additional context, keeping its kind
    pub fn with_context(self, context: &str) -> Self {
        match self {
            Self::Provider { provider, message } => Self::Provider {
                provider,
                message: format!("{}: {}", context, message),
            },
            other => other,
        }
    }

    /// Whether this error was raised by input validation
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error() {
        let error = DomainError::validation("Invalid input");
        assert_eq!(error.to_string(), "Validation error: Invalid input");
        assert!(error.is_validation());
    }

    #[test]
    fn test_provider_error_with_context() {
        let error = DomainError::provider("openai", "Rate limit exceeded")
            .with_context("Failed to generate embedding");

        assert_eq!(
            error.to_string(),
            "Provider error: openai - Failed to generate embedding: Rate limit exceeded"
        );
    }

    #[test]
    fn test_context_leaves_other_kinds_untouched() {
        let error = DomainError::write("boom").with_context("ignored");
        assert_eq!(error.to_string(), "Write error: boom");
    }

    #[test]
    fn test_batch_error_reports_written_count() {
        let error = DomainError::batch("store rejected record 2", vec!["a".into(), "b".into()]);
        assert_eq!(
            error.to_string(),
            "Batch error: store rejected record 2 (2 record(s) already written)"
        );
    }
}

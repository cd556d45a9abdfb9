//! Memory and text validation

use std::fmt;

use serde_json::Value;

use super::NewMemory;
use super::record::DEFAULT_SOURCE;
use crate::domain::DomainError;

/// Memory validation errors
#[derive(Debug, Clone, PartialEq)]
pub enum MemoryValidationError {
    /// Required string field is missing, empty or whitespace-only
    EmptyField { field: &'static str },
    /// Field is present but has the wrong type
    WrongType {
        field: &'static str,
        expected: &'static str,
    },
    /// Record is not an object
    NotAnObject,
}

impl fmt::Display for MemoryValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyField { field } => write!(f, "{} must be a non-empty string", field),
            Self::WrongType { field, expected } => write!(f, "{} must be {}", field, expected),
            Self::NotAnObject => write!(f, "must be an object"),
        }
    }
}

impl std::error::Error for MemoryValidationError {}

impl MemoryValidationError {
    /// Convert into a domain error, prefixed with the record position
    pub fn at_index(&self, index: usize) -> DomainError {
        match self {
            Self::NotAnObject => {
                DomainError::validation(format!("Memory at index {} {}", index, self))
            }
            _ => DomainError::validation(format!("Memory at index {}: {}", index, self)),
        }
    }
}

impl From<MemoryValidationError> for DomainError {
    fn from(error: MemoryValidationError) -> Self {
        DomainError::validation(error.to_string())
    }
}

/// Whether a string carries any non-whitespace content
pub fn validate_text(text: &str) -> bool {
    !text.trim().is_empty()
}

pub(crate) fn validate_required(
    field: &'static str,
    value: &str,
) -> Result<(), MemoryValidationError> {
    if validate_text(value) {
        Ok(())
    } else {
        Err(MemoryValidationError::EmptyField { field })
    }
}

fn required_string(
    object: &serde_json::Map<String, Value>,
    field: &'static str,
) -> Result<String, MemoryValidationError> {
    match object.get(field) {
        Some(Value::String(s)) => {
            validate_required(field, s)?;
            Ok(s.clone())
        }
        _ => Err(MemoryValidationError::EmptyField { field }),
    }
}

impl NewMemory {
    /// Builds a memory from an untyped record, e.g. one element of a JSON file
    ///
    /// Errors carry the record index and the first invalid field.
    pub fn from_value(index: usize, value: &Value) -> Result<Self, DomainError> {
        Self::parse_value(value).map_err(|e| e.at_index(index))
    }

    fn parse_value(value: &Value) -> Result<Self, MemoryValidationError> {
        let object = value.as_object().ok_or(MemoryValidationError::NotAnObject)?;

        let content = required_string(object, "content")?;
        let project = required_string(object, "project")?;
        let repo = required_string(object, "repo")?;
        let agent = required_string(object, "agent")?;

        let tags_error = MemoryValidationError::WrongType {
            field: "tags",
            expected: "a list of strings",
        };
        let tags = match object.get("tags") {
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| item.as_str().map(str::to_string))
                .collect::<Option<Vec<_>>>()
                .ok_or(tags_error)?,
            _ => return Err(tags_error),
        };

        let source = match object.get("source") {
            None | Some(Value::Null) => DEFAULT_SOURCE.to_string(),
            Some(Value::String(s)) => s.clone(),
            Some(_) => {
                return Err(MemoryValidationError::WrongType {
                    field: "source",
                    expected: "a string",
                });
            }
        };

        Ok(NewMemory {
            content,
            project,
            repo,
            agent,
            tags,
            source,
        })
    }
}

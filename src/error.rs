//! Errors raised while scheduling and running the mapping rules.

use thiserror::Error;

/// Every variant aborts the extraction run it occurs in.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MappingError {
    /// The provides/requires labels of the rule catalogue form a cycle
    #[error("Cyclic dependency between rule labels: {}", .nodes.join(", "))]
    CyclicDependency { nodes: Vec<String> },

    /// A rule read an identifier role that no earlier rule minted
    #[error("Unresolved reference to identifier role '{role}'")]
    UnresolvedReference { role: String },

    /// A language name matched no ISO 639 code
    #[error("Unsupported language {language}")]
    UnsupportedLanguage { language: String },

    /// A required field is missing or has an unexpected shape
    #[error("Malformed document field '{field}': {reason}")]
    MalformedDocumentField { field: String, reason: String },

    /// A rule's query path does not parse
    #[error("Invalid query '{query}': {reason}")]
    InvalidQuery { query: String, reason: String },
}

impl MappingError {
    pub fn missing(field: impl Into<String>) -> Self {
        MappingError::MalformedDocumentField {
            field: field.into(),
            reason: "field is missing".to_string(),
        }
    }

    pub fn malformed(field: impl Into<String>, reason: impl Into<String>) -> Self {
        MappingError::MalformedDocumentField {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

pub type MappingResult<T> = Result<T, MappingError>;

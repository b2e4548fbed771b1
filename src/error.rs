use thiserror::Error;

/// Main error type for Quarry operations
#[derive(Error, Debug)]
pub enum QuarryError {
    #[error("Document is missing a non-empty `id`")]
    MissingDocumentId,

    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    #[error("Mapping conflict on field `{field}`: mapped as {existing}, got {requested}")]
    MappingConflict {
        field: String,
        existing: String,
        requested: String,
    },

    #[error("Invalid value for field `{field}` ({expected}): {reason}")]
    InvalidFieldValue {
        field: String,
        expected: String,
        reason: String,
    },

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Scorer error: {0}")]
    Scorer(String),

    #[error("Stemmer error: {0}")]
    Stemmer(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Snapshot error: incompatible version {actual}, expected <= {expected}")]
    IncompatibleSnapshot { expected: u32, actual: u32 },

    #[error("Checksum mismatch: expected {expected:#010x}, got {actual:#010x}")]
    ChecksumMismatch { expected: u32, actual: u32 },

    #[error("Unknown index: {0}")]
    UnknownIndex(String),

    #[error("Index already exists: {0}")]
    IndexExists(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for Quarry operations
pub type Result<T> = std::result::Result<T, QuarryError>;

impl QuarryError {
    /// Errors raised synchronously to the caller of `add` or a mapping mutation
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            QuarryError::MissingDocumentId
                | QuarryError::InvalidDocument(_)
                | QuarryError::MappingConflict { .. }
                | QuarryError::InvalidFieldValue { .. }
        )
    }

    /// Errors coming from a snapshot store, write-ahead log or mapping store
    pub fn is_persistence(&self) -> bool {
        matches!(
            self,
            QuarryError::Persistence(_)
                | QuarryError::Serialization(_)
                | QuarryError::Json(_)
                | QuarryError::Io(_)
                | QuarryError::IncompatibleSnapshot { .. }
                | QuarryError::ChecksumMismatch { .. }
        )
    }

    pub(crate) fn invalid_value(
        field: &str,
        expected: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        QuarryError::InvalidFieldValue {
            field: field.to_string(),
            expected: expected.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = QuarryError::MappingConflict {
            field: "price".to_string(),
            existing: "float".to_string(),
            requested: "text".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Mapping conflict on field `price`: mapped as float, got text"
        );
        assert_eq!(
            QuarryError::MissingDocumentId.to_string(),
            "Document is missing a non-empty `id`"
        );
    }

    #[test]
    fn test_error_classes() {
        assert!(QuarryError::MissingDocumentId.is_validation());
        assert!(QuarryError::invalid_value("loc", "geo_point", "bad").is_validation());
        assert!(!QuarryError::Scorer("boom".into()).is_validation());

        assert!(QuarryError::Persistence("disk full".into()).is_persistence());
        assert!(QuarryError::ChecksumMismatch {
            expected: 1,
            actual: 2
        }
        .is_persistence());
        assert!(!QuarryError::UnknownIndex("x".into()).is_persistence());
    }
}

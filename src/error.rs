use thiserror::Error;

use crate::query::validation::ValidationErrors;

/// Main error type for query DSL operations
#[derive(Error, Debug)]
pub enum QueryDslError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unexpected end of stream: needed {needed} bytes, {remaining} remaining")]
    UnexpectedEof { needed: usize, remaining: usize },

    #[error("Unknown named query [{0}]")]
    UnknownNamedQuery(String),

    #[error("Named query [{0}] is already registered")]
    DuplicateNamedQuery(String),

    #[error("Invalid string in stream: {0}")]
    InvalidString(#[from] std::string::FromUtf8Error),

    #[error("Invalid boolean byte in stream: {0}")]
    InvalidBool(u8),

    #[error("Variable-length integer is longer than 5 bytes")]
    VIntTooLong,

    #[error("String of {length} bytes exceeds the limit of {max}")]
    StringTooLong { length: usize, max: usize },

    #[error("Maximum query nesting depth of {0} exceeded")]
    NestingTooDeep(usize),

    #[error("{0} trailing bytes after the top-level query")]
    TrailingBytes(usize),

    #[error("Query shard error: {0}")]
    QueryShard(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("{0}")]
    Validation(ValidationErrors),

    #[error("Invalid settings: {0}")]
    InvalidSettings(String),
}

/// Result type alias for query DSL operations
pub type Result<T> = std::result::Result<T, QueryDslError>;

impl QueryDslError {
    /// Check if this error means the binary stream itself is malformed
    ///
    /// Such errors are reported by the stream and registry, never by the
    /// node being decoded.
    pub fn is_stream_corruption(&self) -> bool {
        matches!(
            self,
            QueryDslError::UnexpectedEof { .. }
                | QueryDslError::UnknownNamedQuery(_)
                | QueryDslError::InvalidString(_)
                | QueryDslError::InvalidBool(_)
                | QueryDslError::VIntTooLong
                | QueryDslError::StringTooLong { .. }
                | QueryDslError::TrailingBytes(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = QueryDslError::UnknownNamedQuery("span_last".to_string());
        assert_eq!(err.to_string(), "Unknown named query [span_last]");

        let err = QueryDslError::UnexpectedEof {
            needed: 4,
            remaining: 1,
        };
        assert_eq!(
            err.to_string(),
            "Unexpected end of stream: needed 4 bytes, 1 remaining"
        );
    }

    #[test]
    fn test_stream_corruption_errors() {
        assert!(QueryDslError::UnknownNamedQuery("x".to_string()).is_stream_corruption());
        assert!(QueryDslError::VIntTooLong.is_stream_corruption());
        assert!(!QueryDslError::QueryShard("unmapped".to_string()).is_stream_corruption());
        assert!(!QueryDslError::NestingTooDeep(8).is_stream_corruption());
    }
}

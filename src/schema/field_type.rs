//! Field type definitions
//!
//! Defines how fields are indexed and which span queries they can serve.

use serde::{Deserialize, Serialize};

/// Field data type
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "type")]
pub enum FieldType {
    /// Full-text searchable field
    ///
    /// Text fields are analyzed before indexing. Span queries need the
    /// term positions recorded at index time.
    Text {
        /// Analyzer to use for indexing
        #[serde(default = "default_analyzer")]
        analyzer: String,
        /// Store term positions for phrase and span queries
        #[serde(default = "default_true")]
        index_positions: bool,
    },

    /// Exact match keyword field
    ///
    /// The entire value is indexed as a single term at position 0.
    Keyword {
        /// Normalize before indexing (e.g., lowercase)
        #[serde(default)]
        normalizer: Option<String>,
    },

    /// 64-bit signed integer
    Long,

    /// 64-bit floating point
    Double,

    /// Boolean value
    Boolean,

    /// Date/time field
    Date,

    /// Object holding nested field mappings
    Object,
}

fn default_analyzer() -> String {
    "standard".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for FieldType {
    fn default() -> Self {
        FieldType::text()
    }
}

impl FieldType {
    /// Create a text field with default settings
    pub fn text() -> Self {
        FieldType::Text {
            analyzer: default_analyzer(),
            index_positions: true,
        }
    }

    /// Create a text field that does not record term positions
    pub fn text_without_positions() -> Self {
        FieldType::Text {
            analyzer: default_analyzer(),
            index_positions: false,
        }
    }

    /// Create a keyword field with default settings
    pub fn keyword() -> Self {
        FieldType::Keyword { normalizer: None }
    }

    /// Type name as it appears in mappings and error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldType::Text { .. } => "text",
            FieldType::Keyword { .. } => "keyword",
            FieldType::Long => "long",
            FieldType::Double => "double",
            FieldType::Boolean => "boolean",
            FieldType::Date => "date",
            FieldType::Object => "object",
        }
    }

    /// Check if this field type indexes terms that span queries can match
    pub fn supports_span(&self) -> bool {
        matches!(self, FieldType::Text { .. } | FieldType::Keyword { .. })
    }

    /// Check if term positions are available for this field type
    pub fn has_positions(&self) -> bool {
        match self {
            FieldType::Text {
                index_positions, ..
            } => *index_positions,
            FieldType::Keyword { .. } => true,
            _ => false,
        }
    }
}

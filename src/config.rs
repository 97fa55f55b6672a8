use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::QueryDslError;
use crate::Result;

/// Limits applied while decoding queries from a binary stream
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamSettings {
    /// Maximum depth of nested named queries a single decode may descend
    pub max_nesting_depth: usize,
    /// Maximum byte length of any string read from the stream
    pub max_string_length: usize,
}

impl Default for StreamSettings {
    fn default() -> Self {
        Self {
            max_nesting_depth: 64,
            max_string_length: 32 * 1024,
        }
    }
}

impl StreamSettings {
    /// Create settings with explicit limits
    pub fn new(max_nesting_depth: usize, max_string_length: usize) -> Self {
        Self {
            max_nesting_depth,
            max_string_length,
        }
    }

    /// Parse settings from a JSON document, filling in defaults for missing keys
    pub fn from_json_str(json: &str) -> Result<Self> {
        let settings: StreamSettings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Reject limits that would make every decode fail
    pub fn validate(&self) -> Result<()> {
        if self.max_nesting_depth == 0 {
            return Err(QueryDslError::InvalidSettings(
                "max_nesting_depth must be at least 1".to_string(),
            ));
        }
        if self.max_string_length == 0 {
            return Err(QueryDslError::InvalidSettings(
                "max_string_length must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

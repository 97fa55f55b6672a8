//! Index mapping definitions
//!
//! Mappings define the schema a shard resolves query fields against.

use super::field_type::FieldType;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Dynamic mapping behavior for unmapped fields
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DynamicMapping {
    /// Unmapped fields are accepted (default)
    #[default]
    True,
    /// Unmapped fields are ignored at index time but still queryable
    False,
    /// Unmapped fields are rejected
    Strict,
}

impl DynamicMapping {
    /// Check if unmapped fields should cause an error
    pub fn should_reject_unmapped(&self) -> bool {
        matches!(self, DynamicMapping::Strict)
    }
}

/// Field mapping configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FieldMapping {
    /// Field data type
    #[serde(flatten)]
    pub field_type: FieldType,

    /// Whether to index this field (default: true)
    #[serde(default = "default_true")]
    pub index: bool,

    /// Nested field mappings (for object types)
    #[serde(default)]
    pub properties: Option<HashMap<String, FieldMapping>>,
}

fn default_true() -> bool {
    true
}

impl Default for FieldMapping {
    fn default() -> Self {
        Self {
            field_type: FieldType::default(),
            index: true,
            properties: None,
        }
    }
}

impl FieldMapping {
    /// Create a new field mapping with the given type
    pub fn new(field_type: FieldType) -> Self {
        Self {
            field_type,
            ..Default::default()
        }
    }

    /// Create a text field mapping
    pub fn text() -> Self {
        Self::new(FieldType::text())
    }

    /// Create a keyword field mapping
    pub fn keyword() -> Self {
        Self::new(FieldType::keyword())
    }

    /// Create a long field mapping
    pub fn long() -> Self {
        Self::new(FieldType::Long)
    }

    /// Create an object mapping with nested properties
    pub fn object(properties: HashMap<String, FieldMapping>) -> Self {
        Self {
            field_type: FieldType::Object,
            index: true,
            properties: Some(properties),
        }
    }

    /// Set whether the field should be indexed
    pub fn with_index(mut self, index: bool) -> Self {
        self.index = index;
        self
    }
}

/// Index mapping (schema) definition
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct IndexMapping {
    /// Field mappings
    #[serde(default)]
    pub properties: HashMap<String, FieldMapping>,

    /// Dynamic mapping behavior
    #[serde(default)]
    pub dynamic: DynamicMapping,
}

impl IndexMapping {
    /// Create a new empty mapping
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mapping with strict mode
    pub fn strict() -> Self {
        Self {
            dynamic: DynamicMapping::Strict,
            ..Default::default()
        }
    }

    /// Add a field mapping
    pub fn field(mut self, name: impl Into<String>, mapping: FieldMapping) -> Self {
        self.properties.insert(name.into(), mapping);
        self
    }

    /// Set dynamic mapping behavior
    pub fn with_dynamic(mut self, dynamic: DynamicMapping) -> Self {
        self.dynamic = dynamic;
        self
    }

    /// Get a field mapping by path (supports dot notation)
    pub fn get_field(&self, path: &str) -> Option<&FieldMapping> {
        let mut parts = path.split('.');
        let mut field = self.properties.get(parts.next()?)?;

        for part in parts {
            field = field.properties.as_ref()?.get(part)?;
        }
        Some(field)
    }

    /// Check if a field exists
    pub fn has_field(&self, path: &str) -> bool {
        self.get_field(path).is_some()
    }
}

//! Query shard context
//!
//! The `QueryShardContext` gives query builders access to the shard's field
//! mappings during conversion, and collects named queries as they are built.

use crate::error::QueryDslError;
use crate::query::executable::ExecutableQuery;
use crate::schema::IndexMapping;
use crate::Result;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Named query table (keyed by `_name`)
pub type NamedQueries = Arc<RwLock<HashMap<String, ExecutableQuery>>>;

/// Per-shard context passed to query builders during conversion
pub struct QueryShardContext {
    /// Name of the index this shard belongs to
    index_name: String,

    /// Field mappings of the index
    mapping: Arc<IndexMapping>,

    /// Queries registered under their `_name` while converting
    named_queries: NamedQueries,
}

impl QueryShardContext {
    /// Create a new context over the given mapping
    pub fn new(index_name: impl Into<String>, mapping: IndexMapping) -> Self {
        Self {
            index_name: index_name.into(),
            mapping: Arc::new(mapping),
            named_queries: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Create a context builder
    pub fn builder() -> QueryShardContextBuilder {
        QueryShardContextBuilder::default()
    }

    /// Get the index name
    pub fn index_name(&self) -> &str {
        &self.index_name
    }

    /// Get the index mapping
    pub fn mapping(&self) -> &IndexMapping {
        &self.mapping
    }

    /// Resolve a field for use in a span query
    ///
    /// Returns the indexed field name spans are drawn from. Unmapped fields
    /// resolve to themselves unless the mapping is strict.
    pub fn resolve_span_field(&self, field: &str) -> Result<String> {
        let Some(mapping) = self.mapping.get_field(field) else {
            if self.mapping.dynamic.should_reject_unmapped() {
                return Err(QueryDslError::QueryShard(format!(
                    "No field mapping can be found for the field with name [{}]",
                    field
                )));
            }
            return Ok(field.to_string());
        };

        if !mapping.index {
            return Err(QueryDslError::QueryShard(format!(
                "Cannot search on field [{}] since it is not indexed.",
                field
            )));
        }
        if !mapping.field_type.supports_span() {
            return Err(QueryDslError::QueryShard(format!(
                "field [{}] of type [{}] does not support span queries",
                field,
                mapping.field_type.type_name()
            )));
        }
        if !mapping.field_type.has_positions() {
            return Err(QueryDslError::QueryShard(format!(
                "field [{}] was indexed without position data; cannot run span query",
                field
            )));
        }

        Ok(field.to_string())
    }

    /// Register a converted query under its `_name`
    pub fn add_named_query(&self, name: &str, query: ExecutableQuery) {
        self.named_queries.write().insert(name.to_string(), query);
    }

    /// Look up a named query registered during conversion
    pub fn named_query(&self, name: &str) -> Option<ExecutableQuery> {
        self.named_queries.read().get(name).cloned()
    }

    /// Snapshot of all named queries registered so far
    pub fn named_queries(&self) -> HashMap<String, ExecutableQuery> {
        self.named_queries.read().clone()
    }

    /// Forget all named queries (e.g. before converting another request)
    pub fn clear_named_queries(&self) {
        self.named_queries.write().clear();
    }
}

/// Builder for QueryShardContext
#[derive(Default)]
pub struct QueryShardContextBuilder {
    index_name: Option<String>,
    mapping: IndexMapping,
}

impl QueryShardContextBuilder {
    /// Set the index name
    pub fn index_name(mut self, name: impl Into<String>) -> Self {
        self.index_name = Some(name.into());
        self
    }

    /// Set the index mapping
    pub fn mapping(mut self, mapping: IndexMapping) -> Self {
        self.mapping = mapping;
        self
    }

    /// Build the QueryShardContext
    pub fn build(self) -> QueryShardContext {
        let index_name = self.index_name.unwrap_or_else(|| "_na_".to_string());
        QueryShardContext::new(index_name, self.mapping)
    }
}

//! Span term query - a single term as a span

use serde_json::{Map, Value};
use std::any::Any;
use std::hash::{Hash, Hasher};

use crate::query::ast::{QueryBase, QueryNode, SpanQueryNode};
use crate::query::context::QueryShardContext;
use crate::query::executable::{ExecutableQuery, SpanQuery};
use crate::query::stream::{StreamInput, StreamOutput};
use crate::query::validation::ValidationErrors;
use crate::Result;

/// Span query matching an exact term in a field
///
/// Every occurrence of the term produces a span of length one. This is
/// the leaf other span queries are built from.
///
/// ```json
/// { "span_term": { "title": { "value": "rust" } } }
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SpanTermQuery {
    field: String,
    value: String,
    base: QueryBase,
}

impl SpanTermQuery {
    pub const NAME: &'static str = "span_term";

    /// Create a new span term query
    pub fn new(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
            base: QueryBase::default(),
        }
    }

    /// Set the boost factor
    pub fn with_boost(mut self, boost: f32) -> Self {
        self.base.set_boost(boost);
        self
    }

    /// Set the name this query is reported under
    pub fn with_query_name(mut self, name: impl Into<String>) -> Self {
        self.base.set_query_name(name);
        self
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Read a span term query whose discriminator was already consumed
    pub fn read_from(input: &mut StreamInput<'_>) -> Result<Self> {
        let field = input.read_string()?;
        let value = input.read_string()?;
        let base = QueryBase::read_from(input)?;
        Ok(Self { field, value, base })
    }

    pub(crate) fn read_boxed(input: &mut StreamInput<'_>) -> Result<Box<dyn SpanQueryNode>> {
        Ok(Box::new(Self::read_from(input)?))
    }
}

impl QueryNode for SpanTermQuery {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn base(&self) -> &QueryBase {
        &self.base
    }

    fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        if self.field.is_empty() {
            errors.add("field name is null or empty");
        }
        errors
    }

    fn to_query(&self, ctx: &QueryShardContext) -> Result<ExecutableQuery> {
        Ok(ExecutableQuery::Span(self.to_span_query(ctx)?))
    }

    fn do_write_to(&self, out: &mut StreamOutput) -> Result<()> {
        out.write_string(&self.field)?;
        out.write_string(&self.value)
    }

    // Boost and `_name` live in the per-field object for term-level queries,
    // so they are rendered here and `to_json` skips the top-level pass.
    fn do_json(&self, body: &mut Map<String, Value>) -> Result<()> {
        let mut field_body = Map::new();
        field_body.insert("value".to_string(), Value::from(self.value.as_str()));
        self.base.render_into(&mut field_body);
        body.insert(self.field.clone(), Value::Object(field_body));
        Ok(())
    }

    fn to_json(&self) -> Result<Value> {
        let mut body = Map::new();
        self.do_json(&mut body)?;

        let mut root = Map::new();
        root.insert(Self::NAME.to_string(), Value::Object(body));
        Ok(Value::Object(root))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn dyn_eq(&self, other: &dyn Any) -> bool {
        other.downcast_ref::<Self>().is_some_and(|other| self == other)
    }

    fn dyn_hash(&self, mut state: &mut dyn Hasher) {
        self.hash(&mut state);
    }

    fn clone_box(&self) -> Box<dyn QueryNode> {
        Box::new(self.clone())
    }
}

impl SpanQueryNode for SpanTermQuery {
    fn do_to_span_query(&self, ctx: &QueryShardContext) -> Result<SpanQuery> {
        let field = ctx.resolve_span_field(&self.field)?;
        Ok(SpanQuery::Term {
            field,
            term: self.value.clone(),
        })
    }

    fn clone_span_box(&self) -> Box<dyn SpanQueryNode> {
        Box::new(self.clone())
    }
}

//! Abstract Syntax Tree for query builders
//!
//! This module defines the `QueryNode` trait that all query builders
//! implement, the `SpanQueryNode` marker for builders that may appear in
//! span-only positions, and `QueryBase`, the boost and `_name` fields every
//! builder carries.

use ordered_float::OrderedFloat;
use serde_json::{Map, Value};
use std::any::Any;
use std::fmt::Debug;
use std::hash::{Hash, Hasher};

use super::context::QueryShardContext;
use super::executable::{ExecutableQuery, SpanQuery};
use super::stream::{StreamInput, StreamOutput};
use super::validation::ValidationErrors;
use crate::Result;

/// Boost applied when none is set
pub const DEFAULT_BOOST: f32 = 1.0;

/// Core trait for all query builder nodes
///
/// Builders are immutable values mirroring the shape of the executable
/// query they convert into. Each builder type has a unique `name`, used as
/// the discriminator in both the binary and the JSON rendering.
pub trait QueryNode: Send + Sync + Debug {
    /// Registered name of this builder type
    fn name(&self) -> &'static str;

    /// Shared boost and `_name` fields
    fn base(&self) -> &QueryBase;

    fn boost(&self) -> f32 {
        self.base().boost()
    }

    fn query_name(&self) -> Option<&str> {
        self.base().query_name()
    }

    /// Check this builder and everything nested in it
    ///
    /// Every violated rule is reported; an empty result means the builder
    /// can be converted.
    fn validate(&self) -> ValidationErrors {
        ValidationErrors::new()
    }

    /// Convert into the executable form
    ///
    /// Callers validate first; conversion does not re-check.
    fn to_query(&self, ctx: &QueryShardContext) -> Result<ExecutableQuery>;

    /// Write this builder's own fields (without the discriminator)
    fn do_write_to(&self, out: &mut StreamOutput) -> Result<()>;

    /// Write this builder's fields followed by the shared base fields
    fn write_to(&self, out: &mut StreamOutput) -> Result<()> {
        self.do_write_to(out)?;
        self.base().write_to(out)
    }

    /// Render this builder's own fields into its JSON object
    fn do_json(&self, body: &mut Map<String, Value>) -> Result<()>;

    /// Render `{ name: { fields..., boost, _name } }`
    fn to_json(&self) -> Result<Value> {
        let mut body = Map::new();
        self.do_json(&mut body)?;
        self.base().render_into(&mut body);

        let mut root = Map::new();
        root.insert(self.name().to_string(), Value::Object(body));
        Ok(Value::Object(root))
    }

    /// Compact JSON text of [`QueryNode::to_json`]
    fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.to_json()?)?)
    }

    fn as_any(&self) -> &dyn Any;

    /// Compare with another builder of any type
    fn dyn_eq(&self, other: &dyn Any) -> bool;

    /// Feed this builder's fields into a hasher
    fn dyn_hash(&self, state: &mut dyn Hasher);

    /// Clone this builder into a boxed trait object
    fn clone_box(&self) -> Box<dyn QueryNode>;
}

/// Builders that may be nested where only span queries are allowed
///
/// Span builders convert into [`SpanQuery`] directly, so a span slot can
/// only ever hold something the engine accepts as a span.
pub trait SpanQueryNode: QueryNode {
    /// Convert this builder's own semantics, ignoring boost and `_name`
    fn do_to_span_query(&self, ctx: &QueryShardContext) -> Result<SpanQuery>;

    /// Convert into a span query, applying boost and registering `_name`
    fn to_span_query(&self, ctx: &QueryShardContext) -> Result<SpanQuery> {
        let mut query = self.do_to_span_query(ctx)?;
        if self.boost() != DEFAULT_BOOST {
            query = SpanQuery::Boost {
                inner: Box::new(query),
                boost: self.boost(),
            };
        }
        if let Some(name) = self.query_name() {
            ctx.add_named_query(name, ExecutableQuery::Span(query.clone()));
        }
        Ok(query)
    }

    /// Clone this builder into a boxed span trait object
    fn clone_span_box(&self) -> Box<dyn SpanQueryNode>;
}

impl Clone for Box<dyn QueryNode> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

impl Clone for Box<dyn SpanQueryNode> {
    fn clone(&self) -> Self {
        self.clone_span_box()
    }
}

impl<'a> PartialEq for dyn QueryNode + 'a {
    fn eq(&self, other: &Self) -> bool {
        self.dyn_eq(other.as_any())
    }
}

impl<'a> PartialEq for dyn SpanQueryNode + 'a {
    fn eq(&self, other: &Self) -> bool {
        self.dyn_eq(other.as_any())
    }
}

impl<'a> Eq for dyn QueryNode + 'a {}

impl<'a> Eq for dyn SpanQueryNode + 'a {}

impl<'a> Hash for dyn QueryNode + 'a {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name().hash(state);
        self.dyn_hash(state);
    }
}

impl<'a> Hash for dyn SpanQueryNode + 'a {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name().hash(state);
        self.dyn_hash(state);
    }
}

/// Fields shared by every query builder
///
/// Boost compares and hashes through [`OrderedFloat`], so every boost,
/// including NaN, is equal to itself.
#[derive(Clone, Debug)]
pub struct QueryBase {
    boost: f32,
    query_name: Option<String>,
}

impl Default for QueryBase {
    fn default() -> Self {
        Self {
            boost: DEFAULT_BOOST,
            query_name: None,
        }
    }
}

impl QueryBase {
    pub fn boost(&self) -> f32 {
        self.boost
    }

    pub fn query_name(&self) -> Option<&str> {
        self.query_name.as_deref()
    }

    pub fn set_boost(&mut self, boost: f32) {
        self.boost = boost;
    }

    pub fn set_query_name(&mut self, name: impl Into<String>) {
        self.query_name = Some(name.into());
    }

    /// Write boost then the optional `_name`
    pub fn write_to(&self, out: &mut StreamOutput) -> Result<()> {
        out.write_f32(self.boost);
        out.write_optional_string(self.query_name.as_deref())
    }

    /// Read the fields written by [`QueryBase::write_to`]
    pub fn read_from(input: &mut StreamInput<'_>) -> Result<Self> {
        let boost = input.read_f32()?;
        let query_name = input.read_optional_string()?;
        Ok(Self { boost, query_name })
    }

    /// Append `boost` and `_name` when they differ from the defaults
    pub fn render_into(&self, body: &mut Map<String, Value>) {
        if self.boost != DEFAULT_BOOST {
            body.insert("boost".to_string(), Value::from(self.boost));
        }
        if let Some(name) = &self.query_name {
            body.insert("_name".to_string(), Value::from(name.as_str()));
        }
    }
}

impl PartialEq for QueryBase {
    fn eq(&self, other: &Self) -> bool {
        OrderedFloat(self.boost) == OrderedFloat(other.boost)
            && self.query_name == other.query_name
    }
}

impl Eq for QueryBase {}

impl Hash for QueryBase {
    fn hash<H: Hasher>(&self, state: &mut H) {
        OrderedFloat(self.boost).hash(state);
        self.query_name.hash(state);
    }
}

//! Span first query - spans that end near the start of a field
//!
//! Restricts an inner span query to matches whose end position is at most
//! `end`, e.g. terms that appear within the first few tokens of a title.
//!
//! # Example
//!
//! ```rust
//! use spanquery::query::nodes::{SpanFirstQuery, SpanTermQuery};
//!
//! // "rust" within the first three positions
//! let query = SpanFirstQuery::new(SpanTermQuery::new("title", "rust"), 3);
//! ```

use serde_json::{Map, Value};
use std::any::Any;
use std::hash::{Hash, Hasher};

use crate::error::QueryDslError;
use crate::query::ast::{QueryBase, QueryNode, SpanQueryNode};
use crate::query::context::QueryShardContext;
use crate::query::executable::{ExecutableQuery, SpanQuery};
use crate::query::stream::{StreamInput, StreamOutput};
use crate::query::validation::ValidationErrors;
use crate::Result;

/// Query matching spans of `match` whose end position is at most `end`
///
/// Neither field is checked on construction: a missing inner query or a
/// negative `end` is reported by [`QueryNode::validate`], so a whole tree
/// can be built first and validated once.
///
/// ```json
/// {
///   "span_first": {
///     "match": { "span_term": { "title": { "value": "rust" } } },
///     "end": 3
///   }
/// }
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SpanFirstQuery {
    /// Inner span query; `None` only for a tree that is still being decoded or parsed
    match_query: Option<Box<dyn SpanQueryNode>>,
    /// Maximum end position of a matching span
    end: i32,
    base: QueryBase,
}

impl SpanFirstQuery {
    pub const NAME: &'static str = "span_first";

    /// Create a new span first query
    pub fn new(match_query: impl SpanQueryNode + 'static, end: i32) -> Self {
        Self::from_boxed(Box::new(match_query), end)
    }

    /// Create a span first query around an already boxed inner query
    pub fn from_boxed(match_query: Box<dyn SpanQueryNode>, end: i32) -> Self {
        Self::from_parts(Some(match_query), end)
    }

    /// Create a span first query whose inner query may be missing
    ///
    /// Used by parsers that reconstruct a tree before validating it. A
    /// query without an inner query fails validation and cannot be
    /// converted, written or rendered.
    pub fn from_parts(match_query: Option<Box<dyn SpanQueryNode>>, end: i32) -> Self {
        Self {
            match_query,
            end,
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

    /// The inner span query
    pub fn match_query(&self) -> Option<&dyn SpanQueryNode> {
        self.match_query.as_deref()
    }

    /// Maximum end position of the inner query's matches
    pub fn end(&self) -> i32 {
        self.end
    }

    fn require_match(&self) -> Result<&dyn SpanQueryNode> {
        self.match_query().ok_or_else(|| {
            QueryDslError::InvalidQuery("inner clause [match] cannot be null.".to_string())
        })
    }

    /// Read a span first query whose discriminator was already consumed
    pub fn read_from(input: &mut StreamInput<'_>) -> Result<Self> {
        let match_query = input.read_named_span_query()?;
        let end = input.read_i32()?;
        let base = QueryBase::read_from(input)?;
        Ok(Self {
            match_query: Some(match_query),
            end,
            base,
        })
    }

    pub(crate) fn read_boxed(input: &mut StreamInput<'_>) -> Result<Box<dyn SpanQueryNode>> {
        Ok(Box::new(Self::read_from(input)?))
    }
}

impl QueryNode for SpanFirstQuery {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn base(&self) -> &QueryBase {
        &self.base
    }

    fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        match self.match_query() {
            None => errors.add("inner clause [match] cannot be null."),
            Some(inner) => errors.add_inner(inner),
        }
        if self.end < 0 {
            errors.add("parameter [end] needs to be positive.");
        }
        errors
    }

    fn to_query(&self, ctx: &QueryShardContext) -> Result<ExecutableQuery> {
        Ok(ExecutableQuery::Span(self.to_span_query(ctx)?))
    }

    fn do_write_to(&self, out: &mut StreamOutput) -> Result<()> {
        out.write_named_query(self.require_match()?)?;
        out.write_i32(self.end);
        Ok(())
    }

    fn do_json(&self, body: &mut Map<String, Value>) -> Result<()> {
        body.insert("match".to_string(), self.require_match()?.to_json()?);
        body.insert("end".to_string(), Value::from(self.end));
        Ok(())
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

impl SpanQueryNode for SpanFirstQuery {
    fn do_to_span_query(&self, ctx: &QueryShardContext) -> Result<SpanQuery> {
        let inner = self.require_match()?.to_span_query(ctx)?;
        Ok(SpanQuery::First {
            inner: Box::new(inner),
            end: self.end,
        })
    }

    fn clone_span_box(&self) -> Box<dyn SpanQueryNode> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StreamSettings;
    use crate::query::nodes::SpanTermQuery;
    use crate::query::registry::NamedQueryRegistry;
    use crate::schema::{FieldMapping, IndexMapping};
    use std::collections::hash_map::DefaultHasher;

    fn create_test_context() -> QueryShardContext {
        let mapping = IndexMapping::strict()
            .field("title", FieldMapping::text())
            .field("year", FieldMapping::long());
        QueryShardContext::new("articles", mapping)
    }

    fn term(value: &str) -> SpanTermQuery {
        SpanTermQuery::new("title", value)
    }

    fn span_term(value: &str) -> SpanQuery {
        SpanQuery::Term {
            field: "title".to_string(),
            term: value.to_string(),
        }
    }

    fn hash_of(query: &SpanFirstQuery) -> u64 {
        let mut hasher = DefaultHasher::new();
        query.hash(&mut hasher);
        hasher.finish()
    }

    fn round_trip(query: &SpanFirstQuery) -> Box<dyn SpanQueryNode> {
        let mut out = StreamOutput::new();
        out.write_named_query(query).unwrap();
        NamedQueryRegistry::default()
            .decode_span_query(out.freeze())
            .unwrap()
    }

    #[test]
    fn test_span_first_creation() {
        let query = SpanFirstQuery::new(term("rust"), 3);
        assert_eq!(query.end(), 3);
        assert_eq!(query.name(), "span_first");
        assert_eq!(query.boost(), 1.0);
        let inner: &dyn SpanQueryNode = &term("rust");
        assert!(query.match_query().unwrap() == inner);
    }

    #[test]
    fn test_negative_end_is_constructible() {
        let query = SpanFirstQuery::new(term("rust"), -1);
        assert_eq!(query.end(), -1);
    }

    #[test]
    fn test_validate_valid() {
        assert!(SpanFirstQuery::new(term("rust"), 0).validate().is_empty());
        assert!(SpanFirstQuery::new(term("rust"), 5).validate().is_empty());
    }

    #[test]
    fn test_validate_missing_match() {
        let errors = SpanFirstQuery::from_parts(None, 5).validate();
        assert_eq!(errors.messages(), vec!["inner clause [match] cannot be null."]);
    }

    #[test]
    fn test_validate_negative_end() {
        let errors = SpanFirstQuery::new(term("rust"), -1).validate();
        assert_eq!(errors.messages(), vec!["parameter [end] needs to be positive."]);
    }

    #[test]
    fn test_validate_collects_everything() {
        let errors = SpanFirstQuery::new(SpanTermQuery::new("", "rust"), -1).validate();
        assert_eq!(
            errors.messages(),
            vec![
                "field name is null or empty",
                "parameter [end] needs to be positive."
            ]
        );

        let errors = SpanFirstQuery::from_parts(None, -3).validate();
        assert_eq!(
            errors.messages(),
            vec![
                "inner clause [match] cannot be null.",
                "parameter [end] needs to be positive."
            ]
        );
    }

    #[test]
    fn test_validate_nested_span_first() {
        let inner = SpanFirstQuery::new(term("rust"), -2);
        let errors = SpanFirstQuery::new(inner, 4).validate();
        assert_eq!(errors.messages(), vec!["parameter [end] needs to be positive."]);
    }

    #[test]
    fn test_equality_and_hash() {
        let a = SpanFirstQuery::new(term("rust"), 3);
        let b = SpanFirstQuery::new(term("rust"), 3);
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));

        assert_ne!(a, SpanFirstQuery::new(term("rust"), 4));
        assert_ne!(a, SpanFirstQuery::new(term("go"), 3));
        assert_ne!(a, SpanFirstQuery::new(term("rust"), 3).with_boost(2.0));
        assert_ne!(a, SpanFirstQuery::new(term("rust"), 3).with_query_name("q"));
        assert_ne!(a, SpanFirstQuery::from_parts(None, 3));
    }

    #[test]
    fn test_different_types_never_equal() {
        let first: Box<dyn SpanQueryNode> = Box::new(SpanFirstQuery::new(term("rust"), 3));
        let leaf: Box<dyn SpanQueryNode> = Box::new(term("rust"));
        assert_ne!(&first, &leaf);
    }

    #[test]
    fn test_json_rendering() {
        let query = SpanFirstQuery::new(term("rust"), 5);
        assert_eq!(
            query.to_json_string().unwrap(),
            r#"{"span_first":{"match":{"span_term":{"title":{"value":"rust"}}},"end":5}}"#
        );
    }

    #[test]
    fn test_json_rendering_with_boost_and_name() {
        let query = SpanFirstQuery::new(term("rust"), 5)
            .with_boost(2.0)
            .with_query_name("q1");
        assert_eq!(
            query.to_json_string().unwrap(),
            r#"{"span_first":{"match":{"span_term":{"title":{"value":"rust"}}},"end":5,"boost":2.0,"_name":"q1"}}"#
        );
    }

    #[test]
    fn test_json_rendering_missing_match() {
        let err = SpanFirstQuery::from_parts(None, 5).to_json().unwrap_err();
        assert!(matches!(err, QueryDslError::InvalidQuery(_)));
    }

    #[test]
    fn test_to_query() {
        let ctx = create_test_context();
        let query = SpanFirstQuery::new(term("rust"), 5).to_query(&ctx).unwrap();
        assert_eq!(
            query,
            ExecutableQuery::Span(SpanQuery::First {
                inner: Box::new(span_term("rust")),
                end: 5,
            })
        );
        assert_eq!(query.to_string(), "spanFirst(title:rust, 5)");
    }

    #[test]
    fn test_to_query_propagates_context_failure() {
        let ctx = create_test_context();
        let query = SpanFirstQuery::new(SpanTermQuery::new("year", "2024"), 5);

        let expected = ctx.resolve_span_field("year").unwrap_err().to_string();
        let err = query.to_query(&ctx).unwrap_err();
        assert!(matches!(err, QueryDslError::QueryShard(_)));
        assert_eq!(err.to_string(), expected);
    }

    #[test]
    fn test_to_query_missing_match() {
        let ctx = create_test_context();
        let err = SpanFirstQuery::from_parts(None, 5).to_query(&ctx).unwrap_err();
        assert!(matches!(err, QueryDslError::InvalidQuery(_)));
    }

    #[test]
    fn test_to_query_applies_boost_and_name() {
        let ctx = create_test_context();
        let query = SpanFirstQuery::new(term("rust"), 2)
            .with_boost(3.0)
            .with_query_name("early_rust");

        let converted = query.to_query(&ctx).unwrap();
        let expected = SpanQuery::Boost {
            inner: Box::new(SpanQuery::First {
                inner: Box::new(span_term("rust")),
                end: 2,
            }),
            boost: 3.0,
        };
        assert_eq!(converted, ExecutableQuery::Span(expected));
        assert_eq!(ctx.named_query("early_rust"), Some(converted));
    }

    #[test]
    fn test_wire_layout() {
        let mut out = StreamOutput::new();
        out.write_named_query(&SpanFirstQuery::new(SpanTermQuery::new("f", "v"), 5))
            .unwrap();

        let mut expected = Vec::new();
        expected.push(10);
        expected.extend_from_slice(b"span_first");
        expected.push(9);
        expected.extend_from_slice(b"span_term");
        expected.extend_from_slice(&[1, b'f', 1, b'v']);
        expected.extend_from_slice(&[0x3F, 0x80, 0, 0, 0]);
        expected.extend_from_slice(&[0, 0, 0, 5]);
        expected.extend_from_slice(&[0x3F, 0x80, 0, 0, 0]);
        assert_eq!(&out.freeze()[..], &expected[..]);
    }

    #[test]
    fn test_stream_round_trip() {
        let query = SpanFirstQuery::new(term("rust"), 7);
        let expected: Box<dyn SpanQueryNode> = Box::new(query.clone());
        assert_eq!(&round_trip(&query), &expected);
    }

    #[test]
    fn test_stream_round_trip_nested() {
        let query = SpanFirstQuery::new(
            SpanFirstQuery::new(term("rust").with_boost(0.5), 10).with_query_name("inner"),
            -4,
        )
        .with_boost(2.0);

        let decoded = round_trip(&query);
        let decoded = decoded
            .as_any()
            .downcast_ref::<SpanFirstQuery>()
            .expect("decoded a span_first");
        assert_eq!(decoded, &query);
        assert_eq!(hash_of(decoded), hash_of(&query));
    }

    #[test]
    fn test_stream_round_trip_special_boosts() {
        for boost in [f32::NAN, f32::INFINITY, f32::NEG_INFINITY, -0.0] {
            let query = SpanFirstQuery::new(term("rust"), 3).with_boost(boost);
            assert_eq!(query, query.clone());

            let decoded = round_trip(&query);
            let expected: Box<dyn SpanQueryNode> = Box::new(query);
            assert_eq!(&decoded, &expected);
        }
    }

    #[test]
    fn test_write_respects_nesting_limit() {
        let query = SpanFirstQuery::new(SpanFirstQuery::new(term("rust"), 1), 2);

        let mut out = StreamOutput::with_settings(StreamSettings::new(2, 64));
        let err = out.write_named_query(&query).unwrap_err();
        assert!(matches!(err, QueryDslError::NestingTooDeep(2)));

        let mut out = StreamOutput::with_settings(StreamSettings::new(3, 64));
        out.write_named_query(&query).unwrap();
    }

    #[test]
    fn test_write_rejects_oversized_term() {
        let max = StreamSettings::default().max_string_length;
        let query = SpanFirstQuery::new(SpanTermQuery::new("title", "x".repeat(max + 1)), 3);

        let mut out = StreamOutput::new();
        let err = out.write_named_query(&query).unwrap_err();
        assert!(matches!(err, QueryDslError::StringTooLong { length, .. } if length == max + 1));

        let at_limit = SpanFirstQuery::new(SpanTermQuery::new("title", "x".repeat(max)), 3);
        let expected: Box<dyn SpanQueryNode> = Box::new(at_limit.clone());
        assert_eq!(&round_trip(&at_limit), &expected);
    }

    #[test]
    fn test_write_missing_match() {
        let mut out = StreamOutput::new();
        let err = out
            .write_named_query(&SpanFirstQuery::from_parts(None, 1))
            .unwrap_err();
        assert!(matches!(err, QueryDslError::InvalidQuery(_)));
    }

    #[test]
    fn test_truncated_stream() {
        let mut out = StreamOutput::new();
        out.write_named_query(&SpanFirstQuery::new(term("rust"), 7)).unwrap();
        let bytes = out.freeze();

        let registry = NamedQueryRegistry::default();
        let err = registry
            .decode_span_query(bytes.slice(..bytes.len() - 3))
            .unwrap_err();
        assert!(err.is_stream_corruption());
    }

    #[test]
    fn test_builders_are_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SpanFirstQuery>();
        assert_send_sync::<Box<dyn SpanQueryNode>>();
    }
}

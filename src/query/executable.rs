//! Executable query forms
//!
//! These are what the search execution layer consumes. Query builder nodes
//! produce them during conversion and never modify them afterwards.

use std::fmt;

/// A converted query, ready for the execution layer
#[derive(Clone, Debug, PartialEq)]
#[non_exhaustive]
pub enum ExecutableQuery {
    /// Position-aware span query
    Span(SpanQuery),
}

impl ExecutableQuery {
    /// Get the span form, if this query is one
    pub fn as_span(&self) -> Option<&SpanQuery> {
        match self {
            ExecutableQuery::Span(span) => Some(span),
        }
    }

    /// Consume this query and return the span form, if it is one
    pub fn into_span(self) -> Option<SpanQuery> {
        match self {
            ExecutableQuery::Span(span) => Some(span),
        }
    }
}

impl From<SpanQuery> for ExecutableQuery {
    fn from(span: SpanQuery) -> Self {
        ExecutableQuery::Span(span)
    }
}

impl fmt::Display for ExecutableQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutableQuery::Span(span) => fmt::Display::fmt(span, f),
        }
    }
}

/// Span query as understood by the execution engine
#[derive(Clone, Debug, PartialEq)]
pub enum SpanQuery {
    /// Matches a single term, yielding one span per occurrence
    Term { field: String, term: String },
    /// Matches spans of `inner` whose end position is at most `end`
    First { inner: Box<SpanQuery>, end: i32 },
    /// Scales the score of `inner` without changing what it matches
    Boost { inner: Box<SpanQuery>, boost: f32 },
}

impl SpanQuery {
    /// Field every span of this query is drawn from
    pub fn field(&self) -> &str {
        match self {
            SpanQuery::Term { field, .. } => field,
            SpanQuery::First { inner, .. } | SpanQuery::Boost { inner, .. } => inner.field(),
        }
    }
}

impl fmt::Display for SpanQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpanQuery::Term { field, term } => write!(f, "{}:{}", field, term),
            SpanQuery::First { inner, end } => write!(f, "spanFirst({}, {})", inner, end),
            SpanQuery::Boost { inner, boost } => write!(f, "({})^{}", inner, boost),
        }
    }
}

//! Concrete query builder implementations
//!
//! This module provides implementations of the `QueryNode` and
//! `SpanQueryNode` traits for the span query types.

mod span_first;
mod span_term;

pub use span_first::SpanFirstQuery;
pub use span_term::SpanTermQuery;

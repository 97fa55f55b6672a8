//! Query DSL builders
//!
//! This module provides serializable query builders for span queries:
//! - Span term queries (a single term as a span)
//! - Span first queries (spans ending within the first N positions)
//!
//! Every builder validates itself, converts into an executable query
//! through a [`QueryShardContext`], renders to JSON and round-trips through
//! the binary stream format.
//!
//! # Example
//!
//! ```json
//! {
//!   "span_first": {
//!     "match": { "span_term": { "title": { "value": "rust" } } },
//!     "end": 3
//!   }
//! }
//! ```

pub mod ast;
pub mod context;
pub mod converter;
pub mod executable;
pub mod nodes;
pub mod registry;
pub mod stream;
pub mod validation;

pub use ast::{QueryBase, QueryNode, SpanQueryNode, DEFAULT_BOOST};
pub use context::QueryShardContext;
pub use converter::QueryConverter;
pub use executable::{ExecutableQuery, SpanQuery};
pub use nodes::{SpanFirstQuery, SpanTermQuery};
pub use registry::NamedQueryRegistry;
pub use stream::{StreamInput, StreamOutput};
pub use validation::{ValidationError, ValidationErrors};

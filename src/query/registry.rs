//! Named query registry
//!
//! Maps a discriminator read from a binary stream to the decoder for that
//! builder type. Decoders are handed the stream positioned just after the
//! discriminator.

use bytes::Bytes;
use std::collections::HashMap;
use std::fmt;
use tracing::debug;

use crate::config::StreamSettings;
use crate::error::QueryDslError;
use crate::query::ast::SpanQueryNode;
use crate::query::nodes::{SpanFirstQuery, SpanTermQuery};
use crate::query::stream::StreamInput;
use crate::Result;

/// Decoder for a span query body
pub type SpanQueryDecoder = fn(&mut StreamInput<'_>) -> Result<Box<dyn SpanQueryNode>>;

/// Registry of span query decoders keyed by discriminator
#[derive(Clone)]
pub struct NamedQueryRegistry {
    span_decoders: HashMap<&'static str, SpanQueryDecoder>,
}

impl fmt::Debug for NamedQueryRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NamedQueryRegistry")
            .field("span_queries", &self.names())
            .finish()
    }
}

impl Default for NamedQueryRegistry {
    /// Registry with every built-in span query registered
    fn default() -> Self {
        let mut span_decoders: HashMap<&'static str, SpanQueryDecoder> = HashMap::new();
        span_decoders.insert(SpanTermQuery::NAME, SpanTermQuery::read_boxed);
        span_decoders.insert(SpanFirstQuery::NAME, SpanFirstQuery::read_boxed);
        Self { span_decoders }
    }
}

impl NamedQueryRegistry {
    /// Registry with nothing registered
    pub fn empty() -> Self {
        Self {
            span_decoders: HashMap::new(),
        }
    }

    /// Register a decoder for another span query type
    pub fn register_span(&mut self, name: &'static str, decoder: SpanQueryDecoder) -> Result<()> {
        if self.span_decoders.contains_key(name) {
            return Err(QueryDslError::DuplicateNamedQuery(name.to_string()));
        }
        debug!(query = name, "registered span query decoder");
        self.span_decoders.insert(name, decoder);
        Ok(())
    }

    /// Look up the decoder registered for a discriminator
    pub fn span_decoder(&self, name: &str) -> Option<SpanQueryDecoder> {
        self.span_decoders.get(name).copied()
    }

    /// Registered discriminators, sorted
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.span_decoders.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Decode one named span query that makes up the whole buffer
    pub fn decode_span_query(&self, bytes: impl Into<Bytes>) -> Result<Box<dyn SpanQueryNode>> {
        self.decode_span_query_with(bytes, StreamSettings::default())
    }

    /// Like [`NamedQueryRegistry::decode_span_query`] with explicit limits
    pub fn decode_span_query_with(
        &self,
        bytes: impl Into<Bytes>,
        settings: StreamSettings,
    ) -> Result<Box<dyn SpanQueryNode>> {
        let mut input = StreamInput::with_settings(bytes, self, settings);
        let query = input.read_named_span_query()?;
        if !input.is_empty() {
            return Err(QueryDslError::TrailingBytes(input.remaining()));
        }
        debug!(query = query.name(), "decoded span query");
        Ok(query)
    }
}

//! Query converter
//!
//! Runs the validate-then-convert pipeline over a query builder tree.

use tracing::debug;

use crate::query::ast::QueryNode;
use crate::query::context::QueryShardContext;
use crate::query::executable::ExecutableQuery;
use crate::Result;

/// Converter for query builder trees
pub struct QueryConverter;

impl QueryConverter {
    /// Validate a query builder and convert it into its executable form
    ///
    /// # Arguments
    ///
    /// * `query` - The builder tree to convert
    /// * `ctx` - Shard context used to resolve fields
    ///
    /// # Returns
    ///
    /// The executable query, `QueryDslError::Validation` carrying every
    /// violated rule, or the context's own error if conversion fails
    pub fn convert<Q: QueryNode + ?Sized>(
        query: &Q,
        ctx: &QueryShardContext,
    ) -> Result<ExecutableQuery> {
        let errors = query.validate();
        if !errors.is_empty() {
            debug!(
                query = query.name(),
                errors = errors.len(),
                "rejecting query that failed validation"
            );
        }
        errors.into_result()?;

        let converted = query.to_query(ctx)?;
        debug!(
            query = query.name(),
            index = ctx.index_name(),
            executable = %converted,
            "converted query"
        );
        Ok(converted)
    }
}

//! Match-all query

use crate::query::context::QueryContext;
use crate::query::types::Clause;

/// Query that matches every live document with a constant score
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AllDocsQuery;

impl AllDocsQuery {
    pub fn new() -> Self {
        Self
    }

    pub fn execute(&self, ctx: &QueryContext<'_>) -> Clause {
        Clause::constant(ctx.all_docs(), 1.0)
    }
}

//! Query executor
//!
//! Evaluates a query tree into a [`Clause`] with an explicit worklist, so
//! deeply nested boolean queries never grow the call stack.

use crate::query::ast::Query;
use crate::query::context::QueryContext;
use crate::query::nodes::{AllDocsQuery, BoolQuery};
use crate::query::types::Clause;

enum Frame<'q> {
    /// Evaluate a node, or schedule its children
    Enter(&'q Query),
    /// All children of this bool node are on the result stack
    Exit(&'q BoolQuery),
}

/// Query executor for running queries against one engine
pub struct QueryExecutor;

impl QueryExecutor {
    /// Evaluate `query` to its matching documents and score sources
    pub fn execute(query: &Query, ctx: &QueryContext<'_>) -> Clause {
        let mut frames = vec![Frame::Enter(query)];
        let mut results: Vec<Clause> = Vec::new();

        while let Some(frame) = frames.pop() {
            match frame {
                Frame::Enter(Query::Bool(bool_query)) => {
                    frames.push(Frame::Exit(bool_query));
                    // Reversed so children finish in declaration order
                    frames.extend(bool_query.children().rev().map(Frame::Enter));
                }
                Frame::Enter(leaf) => results.push(Self::execute_leaf(leaf, ctx)),
                Frame::Exit(bool_query) => {
                    let split = results.len().saturating_sub(bool_query.clause_count());
                    let children = results.split_off(split);
                    results.push(bool_query.combine(children, || ctx.all_docs()));
                }
            }
        }

        results.pop().unwrap_or_default()
    }

    fn execute_leaf(query: &Query, ctx: &QueryContext<'_>) -> Clause {
        match query {
            Query::MatchAll => AllDocsQuery.execute(ctx),
            Query::MatchNone => Clause::empty(),
            Query::Match(q) => q.execute(ctx),
            Query::MultiMatch(q) => q.execute(ctx),
            Query::Term(q) => q.execute(ctx),
            Query::Terms(q) => q.execute(ctx),
            Query::Prefix(q) => q.execute(ctx),
            Query::Wildcard(q) => q.execute(ctx),
            Query::Fuzzy(q) => q.execute(ctx),
            Query::Range(q) => q.execute(ctx),
            Query::Phrase(q) => q.execute(ctx),
            Query::GeoDistance(q) => q.execute(ctx),
            // Bool nodes are expanded by the worklist
            Query::Bool(_) => Clause::empty(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Document;
    use crate::query::context::test_support::Fixture;
    use crate::query::nodes::{MatchQuery, RangeQuery, TermQuery};
    use crate::schema::{FieldMappings, FieldType};

    fn fixture() -> Fixture {
        let mappings = FieldMappings::new().field("status", FieldType::Keyword).unwrap();
        let mut fx = Fixture::new(mappings);
        fx.add(
            Document::new("1")
                .with_field("title", "rust web server")
                .with_field("status", "published")
                .with_field("stars", 120.0),
        );
        fx.add(
            Document::new("2")
                .with_field("title", "rust cli tool")
                .with_field("status", "draft")
                .with_field("stars", 40.0),
        );
        fx.add(
            Document::new("3")
                .with_field("title", "python web framework")
                .with_field("status", "published")
                .with_field("stars", 300.0),
        );
        fx
    }

    #[test]
    fn test_execute_leaf_and_match_all() {
        let fx = fixture();
        let ctx = fx.ctx();
        assert_eq!(QueryExecutor::execute(&Query::MatchAll, &ctx).len(), 3);
        assert!(QueryExecutor::execute(&Query::MatchNone, &ctx).is_empty());
        let rust: Query = MatchQuery::new("title", "rust").into();
        assert_eq!(fx.ids(&QueryExecutor::execute(&rust, &ctx).matches), vec!["1", "2"]);
    }

    #[test]
    fn test_nested_bool() {
        let fx = fixture();
        let query: Query = BoolQuery::new()
            .must(MatchQuery::new("title", "web"))
            .must_not(
                BoolQuery::new()
                    .should(TermQuery::new("status", "draft"))
                    .should(RangeQuery::new("stars").gt(200.0)),
            )
            .into();
        let clause = QueryExecutor::execute(&query, &fx.ctx());
        assert_eq!(fx.ids(&clause.matches), vec!["1"]);
    }

    #[test]
    fn test_should_boosts_without_filtering() {
        let fx = fixture();
        let query: Query = BoolQuery::new()
            .must(MatchQuery::new("title", "rust"))
            .should(TermQuery::new("status", "archived"))
            .into();
        let clause = QueryExecutor::execute(&query, &fx.ctx());
        assert_eq!(fx.ids(&clause.matches), vec!["1", "2"]);

        let empty_should: Query = BoolQuery::new().into();
        assert!(QueryExecutor::execute(&empty_should, &fx.ctx()).is_empty());
    }

    #[test]
    fn test_deep_nesting_does_not_recurse() {
        let fx = fixture();
        let mut query: Query = MatchQuery::new("title", "rust").into();
        for _ in 0..10_000 {
            query = BoolQuery::new().must(query).into();
        }
        let clause = QueryExecutor::execute(&query, &fx.ctx());
        assert_eq!(clause.len(), 2);
        // Unwind iteratively so dropping the tree does not recurse either
        let mut current = query;
        while let Query::Bool(mut node) = current {
            current = node.must.pop().unwrap_or_default();
        }
    }
}

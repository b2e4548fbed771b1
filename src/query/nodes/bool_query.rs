//! Boolean query - combines multiple clauses with AND, OR, NOT semantics

use roaring::RoaringBitmap;

use crate::query::ast::Query;
use crate::query::types::Clause;

/// Boolean query combining multiple clauses
///
/// The boolean query supports three types of clauses:
/// - `must`: All clauses must match (AND). Contributes to score.
/// - `should`: With `must` present, only adds score. Without `must`, at
///   least one should clause must match (OR).
/// - `must_not`: No clause must match (NOT). Does not contribute to score.
///
/// # Example
///
/// ```json
/// {
///   "bool": {
///     "must": [
///       { "match": { "content": "rust programming" } }
///     ],
///     "should": [
///       { "term": { "tags": "tutorial" } }
///     ],
///     "must_not": [
///       { "term": { "status": "draft" } }
///     ]
///   }
/// }
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BoolQuery {
    /// Clauses that must match (AND, scoring)
    pub must: Vec<Query>,
    /// Score boosts, or OR filtering when `must` is empty
    pub should: Vec<Query>,
    /// Clauses that must not match (NOT, no scoring)
    pub must_not: Vec<Query>,
}

impl BoolQuery {
    /// Create a new empty boolean query
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a must clause
    pub fn must(mut self, query: impl Into<Query>) -> Self {
        self.must.push(query.into());
        self
    }

    /// Add a should clause
    pub fn should(mut self, query: impl Into<Query>) -> Self {
        self.should.push(query.into());
        self
    }

    /// Add a must_not clause
    pub fn must_not(mut self, query: impl Into<Query>) -> Self {
        self.must_not.push(query.into());
        self
    }

    /// Total number of clauses
    pub fn clause_count(&self) -> usize {
        self.must.len() + self.should.len() + self.must_not.len()
    }

    /// Children in evaluation order: must, should, must_not
    pub fn children(&self) -> impl DoubleEndedIterator<Item = &Query> {
        self.must.iter().chain(&self.should).chain(&self.must_not)
    }

    /// Combine evaluated children, given in [`BoolQuery::children`] order
    ///
    /// `all_docs` yields the live set, needed only when `must_not` clauses
    /// stand alone.
    pub fn combine<F>(&self, mut children: Vec<Clause>, all_docs: F) -> Clause
    where
        F: FnOnce() -> RoaringBitmap,
    {
        let must_not = children.split_off(self.must.len() + self.should.len());
        let should = children.split_off(self.must.len());
        let must = children;

        let mut excluded = RoaringBitmap::new();
        for clause in &must_not {
            excluded |= &clause.matches;
        }

        let mut matches = if !must.is_empty() {
            let mut iter = must.iter();
            let mut acc = iter.next().map(|c| c.matches.clone()).unwrap_or_default();
            for clause in iter {
                acc &= &clause.matches;
            }
            acc
        } else if !should.is_empty() {
            let mut acc = RoaringBitmap::new();
            for clause in &should {
                acc |= &clause.matches;
            }
            acc
        } else if !must_not.is_empty() {
            all_docs()
        } else {
            RoaringBitmap::new()
        };
        matches -= excluded;

        let mut result = Clause {
            matches,
            sources: must
                .into_iter()
                .chain(should)
                .flat_map(|clause| clause.sources)
                .collect(),
        };
        let allowed = result.matches.clone();
        result.restrict_sources(&allowed);
        result
    }
}

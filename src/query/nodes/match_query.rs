//! Match query - full-text search with analysis

use roaring::RoaringBitmap;
use std::collections::BTreeSet;
use tracing::debug;

use crate::index::token_key;
use crate::query::context::{union_term_docs, QueryContext};
use crate::query::types::{Clause, MatchOperator};
use crate::tokenizer::AnalyzerMode;

/// Query that performs full-text search on a field
///
/// The input text is analyzed with the field's analyzer and the resulting
/// terms are combined with the operator. Without an explicit operator the
/// search-level operator applies.
#[derive(Clone, Debug, PartialEq)]
pub struct MatchQuery {
    /// Field to search in
    pub field: String,
    /// Text to search for (will be analyzed)
    pub text: String,
    /// How to combine terms (AND/OR)
    pub operator: Option<MatchOperator>,
    /// Analyzer override for text fields
    pub analyzer: Option<AnalyzerMode>,
}

impl MatchQuery {
    /// Create a new match query
    pub fn new(field: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            text: text.into(),
            operator: None,
            analyzer: None,
        }
    }

    pub fn with_operator(mut self, operator: MatchOperator) -> Self {
        self.operator = Some(operator);
        self
    }

    pub fn with_analyzer(mut self, analyzer: AnalyzerMode) -> Self {
        self.analyzer = Some(analyzer);
        self
    }

    /// Analyzed query terms, each widened by its synonyms
    ///
    /// A slot is satisfied by any of its terms.
    pub fn slots(&self, ctx: &QueryContext<'_>) -> Vec<BTreeSet<String>> {
        let terms = ctx.analyze(&self.field, &self.text, self.analyzer);
        terms
            .into_iter()
            .map(|term| {
                let mut slot = BTreeSet::new();
                if let Some(synonyms) = ctx.synonyms() {
                    for synonym in synonyms.get(&term) {
                        slot.extend(ctx.analyze(&self.field, &synonym, self.analyzer));
                    }
                }
                slot.insert(term);
                slot
            })
            .collect()
    }

    pub fn execute(&self, ctx: &QueryContext<'_>) -> Clause {
        if ctx.field_type(&self.field).is_none() {
            debug!(field = %self.field, "match on unmapped field");
            return Clause::empty();
        }

        let slots = self.slots(ctx);
        if slots.is_empty() {
            return Clause::empty();
        }

        let operator = self.operator.unwrap_or_else(|| ctx.operator());
        let mut matches: Option<RoaringBitmap> = None;
        for slot in &slots {
            let docs = union_term_docs(ctx, &self.field, slot.iter().map(String::as_str));
            matches = Some(match (matches, operator) {
                (None, _) => docs,
                (Some(acc), MatchOperator::And) => acc & docs,
                (Some(acc), MatchOperator::Or) => acc | docs,
            });
        }

        let tokens: BTreeSet<String> = slots
            .iter()
            .flatten()
            .map(|term| token_key(&self.field, term))
            .collect();
        Clause::terms(matches.unwrap_or_default(), tokens.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Document;
    use crate::query::context::test_support::Fixture;
    use crate::schema::{FieldMappings, FieldType};
    use crate::tokenizer::SynonymMap;

    fn fixture() -> Fixture {
        let mut fx = Fixture::new(FieldMappings::new());
        fx.add(Document::new("1").with_field("title", "Rust programming language"));
        fx.add(Document::new("2").with_field("title", "Python programming"));
        fx.add(Document::new("3").with_field("title", "Rust compiler"));
        fx
    }

    #[test]
    fn test_and_by_default() {
        let fx = fixture();
        let clause = MatchQuery::new("title", "rust programming").execute(&fx.ctx());
        assert_eq!(fx.ids(&clause.matches), vec!["1"]);
        assert_eq!(clause.sources.len(), 1);
    }

    #[test]
    fn test_or_operator() {
        let fx = fixture();
        let query = MatchQuery::new("title", "rust programming").with_operator(MatchOperator::Or);
        assert_eq!(fx.ids(&query.execute(&fx.ctx()).matches), vec!["1", "2", "3"]);

        let ctx = fx.ctx().with_operator(MatchOperator::Or);
        let clause = MatchQuery::new("title", "rust programming").execute(&ctx);
        assert_eq!(clause.len(), 3);

        let forced = MatchQuery::new("title", "rust programming")
            .with_operator(MatchOperator::And)
            .execute(&ctx);
        assert_eq!(fx.ids(&forced.matches), vec!["1"]);
    }

    #[test]
    fn test_unknown_field_and_stopwords_match_nothing() {
        let fx = fixture();
        assert!(MatchQuery::new("body", "rust").execute(&fx.ctx()).is_empty());
        assert!(MatchQuery::new("title", "the").execute(&fx.ctx()).is_empty());
    }

    #[test]
    fn test_keyword_field_ignores_analyzer_override() {
        let mappings = FieldMappings::new().field("tag", FieldType::Keyword).unwrap();
        let mut fx = Fixture::new(mappings);
        fx.add(Document::new("a").with_field("tag", "Open Source"));
        let query = MatchQuery::new("tag", "open source").with_analyzer(AnalyzerMode::Standard);
        assert_eq!(fx.ids(&query.execute(&fx.ctx()).matches), vec!["a"]);
    }

    #[test]
    fn test_synonym_slots() {
        let fx = fixture();
        let synonyms = SynonymMap::new().with_group(["rust", "oxide"]);
        let ctx = fx.ctx().with_synonyms(Some(&synonyms));
        let clause = MatchQuery::new("title", "oxide compiler").execute(&ctx);
        assert_eq!(fx.ids(&clause.matches), vec!["3"]);
    }
}

//! Term query - exact match on a single term

use crate::index::token_key;
use crate::query::context::{union_term_docs, QueryContext};
use crate::query::types::Clause;

/// Query that matches documents containing an exact term
///
/// The value is not analyzed beyond trimming, so on keyword-style fields it
/// matches the whole indexed value. Comparison ignores case, including on
/// text fields whose analyzer keeps it.
#[derive(Clone, Debug, PartialEq)]
pub struct TermQuery {
    /// Field to search in
    pub field: String,
    /// Exact term to match
    pub value: String,
}

impl TermQuery {
    /// Create a new term query
    pub fn new(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Normalized term looked up in the index
    pub fn term(&self) -> String {
        self.value.trim().to_lowercase()
    }

    pub fn execute(&self, ctx: &QueryContext<'_>) -> Clause {
        let term = self.term();
        if term.is_empty() {
            return Clause::empty();
        }
        let terms = ctx.terms_ignoring_case(&self.field, &term);
        let docs = union_term_docs(ctx, &self.field, terms.iter().copied());
        let tokens = terms.iter().map(|t| token_key(&self.field, t)).collect();
        Clause::terms(docs, tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Document;
    use crate::query::context::test_support::Fixture;
    use crate::schema::{FieldMappings, FieldType};
    use crate::query::types::ScoreKind;
    use crate::tokenizer::AnalyzerMode;

    fn fixture() -> Fixture {
        let mappings = FieldMappings::new()
            .field("status", FieldType::Keyword)
            .unwrap()
            .field("year", FieldType::Integer)
            .unwrap();
        let mut fx = Fixture::new(mappings);
        fx.add(
            Document::new("1")
                .with_field("status", "Published")
                .with_field("year", 2024i64)
                .with_field("title", "Rust in Action"),
        );
        fx.add(
            Document::new("2")
                .with_field("status", "draft")
                .with_field("year", 2023i64),
        );
        fx
    }

    #[test]
    fn test_case_insensitive_exact_match() {
        let fx = fixture();
        let clause = TermQuery::new("status", "PUBLISHED").execute(&fx.ctx());
        assert_eq!(fx.ids(&clause.matches), vec!["1"]);
        assert!(TermQuery::new("status", "publish").execute(&fx.ctx()).is_empty());
    }

    #[test]
    fn test_numeric_and_text_fields() {
        let fx = fixture();
        assert_eq!(fx.ids(&TermQuery::new("year", "2023").execute(&fx.ctx()).matches), vec!["2"]);
        assert_eq!(fx.ids(&TermQuery::new("title", "Rust").execute(&fx.ctx()).matches), vec!["1"]);
    }

    #[test]
    fn test_missing_field_or_empty_value() {
        let fx = fixture();
        assert!(TermQuery::new("missing", "draft").execute(&fx.ctx()).is_empty());
        assert!(TermQuery::new("status", "  ").execute(&fx.ctx()).is_empty());
    }

    #[test]
    fn test_case_preserving_text_field() {
        let mappings = FieldMappings::new()
            .field("code", FieldType::text_with_analyzer(AnalyzerMode::Whitespace))
            .unwrap();
        let mut fx = Fixture::new(mappings);
        fx.add(Document::new("1").with_field("code", "Hello World"));
        fx.add(Document::new("2").with_field("code", "HELLO there"));

        let clause = TermQuery::new("code", "Hello").execute(&fx.ctx());
        assert_eq!(fx.ids(&clause.matches), vec!["1", "2"]);
        assert_eq!(
            clause.sources[0].kind,
            ScoreKind::Terms(vec!["code:HELLO".to_string(), "code:Hello".to_string()])
        );
        assert_eq!(fx.ids(&TermQuery::new("code", "world").execute(&fx.ctx()).matches), vec!["1"]);
    }
}

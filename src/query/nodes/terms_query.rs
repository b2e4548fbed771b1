//! Terms query - match any of multiple exact terms

use std::collections::BTreeSet;

use crate::index::token_key;
use crate::query::context::{union_term_docs, QueryContext};
use crate::query::types::Clause;

/// Query that matches documents containing any of the specified terms
#[derive(Clone, Debug, PartialEq)]
pub struct TermsQuery {
    /// Field to search in
    pub field: String,
    /// Terms to match (OR semantics)
    pub values: Vec<String>,
}

impl TermsQuery {
    /// Create a new terms query
    pub fn new<I, S>(field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            field: field.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn execute(&self, ctx: &QueryContext<'_>) -> Clause {
        let terms: BTreeSet<&str> = self
            .values
            .iter()
            .map(|v| v.trim().to_lowercase())
            .filter(|v| !v.is_empty())
            .flat_map(|v| ctx.terms_ignoring_case(&self.field, &v))
            .collect();

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
    use crate::tokenizer::AnalyzerMode;

    #[test]
    fn test_any_term_matches() {
        let mappings = FieldMappings::new().field("color", FieldType::Keyword).unwrap();
        let mut fx = Fixture::new(mappings);
        fx.add(Document::new("1").with_field("color", "red"));
        fx.add(Document::new("2").with_field("color", "green"));
        fx.add(Document::new("3").with_field("color", "blue"));

        let clause = TermsQuery::new("color", ["Red", "blue", "purple"]).execute(&fx.ctx());
        assert_eq!(fx.ids(&clause.matches), vec!["1", "3"]);

        let none = TermsQuery::new("color", Vec::<String>::new()).execute(&fx.ctx());
        assert!(none.is_empty());
        assert!(none.sources.is_empty());
    }

    #[test]
    fn test_case_preserving_text_field() {
        let mappings = FieldMappings::new()
            .field("code", FieldType::text_with_analyzer(AnalyzerMode::Whitespace))
            .unwrap();
        let mut fx = Fixture::new(mappings);
        fx.add(Document::new("1").with_field("code", "Hello World"));
        fx.add(Document::new("2").with_field("code", "goodbye"));
        fx.add(Document::new("3").with_field("code", "Goodbye"));

        let clause = TermsQuery::new("code", ["hello", "GOODBYE"]).execute(&fx.ctx());
        assert_eq!(fx.ids(&clause.matches), vec!["1", "2", "3"]);
    }
}

//! Query execution context
//!
//! The `QueryContext` gives query nodes read access to one engine's index,
//! document store, mappings and analyzer for the duration of a search.

use roaring::RoaringBitmap;

use crate::index::{split_token, token_key, DocNo, DocStore, Posting, TokenIndex};
use crate::models::FieldValue;
use crate::query::types::MatchOperator;
use crate::schema::{FieldMappings, FieldType};
use crate::tokenizer::{Analyzer, AnalyzerMode, SynonymSource};

/// Terms a field value or query text produces for a field
///
/// Keyword-style fields yield the whole trimmed value, lower-cased; text
/// fields run their analyzer (or `mode_override` when given); geo fields
/// yield nothing.
pub(crate) fn analyze_for_field(
    analyzer: &Analyzer,
    field_type: &FieldType,
    text: &str,
    mode_override: Option<AnalyzerMode>,
) -> Vec<String> {
    match field_type {
        FieldType::Text { analyzer: mode } => {
            analyzer.tokenize(text, mode_override.unwrap_or(*mode))
        }
        FieldType::GeoPoint => Vec::new(),
        _ => analyzer
            .tokenize(text, AnalyzerMode::Keyword)
            .into_iter()
            .map(|term| term.to_lowercase())
            .collect(),
    }
}

/// Terms a stored value indexes under
pub(crate) fn value_terms(
    analyzer: &Analyzer,
    field_type: &FieldType,
    value: &FieldValue,
) -> Vec<String> {
    match value {
        FieldValue::Geo(_) => Vec::new(),
        FieldValue::Text(text) => analyze_for_field(analyzer, field_type, text, None),
        other => analyze_for_field(analyzer, field_type, &other.display_string(), None),
    }
}

/// Query execution context providing access to index data
pub struct QueryContext<'a> {
    index: &'a dyn TokenIndex,
    docs: &'a DocStore,
    mappings: &'a FieldMappings,
    analyzer: &'a Analyzer,
    synonyms: Option<&'a dyn SynonymSource>,
    operator: MatchOperator,
}

impl<'a> QueryContext<'a> {
    pub fn new(
        index: &'a dyn TokenIndex,
        docs: &'a DocStore,
        mappings: &'a FieldMappings,
        analyzer: &'a Analyzer,
    ) -> Self {
        Self {
            index,
            docs,
            mappings,
            analyzer,
            synonyms: None,
            operator: MatchOperator::default(),
        }
    }

    pub fn with_synonyms(mut self, synonyms: Option<&'a dyn SynonymSource>) -> Self {
        self.synonyms = synonyms;
        self
    }

    /// Search-level operator, the default for match queries
    pub fn with_operator(mut self, operator: MatchOperator) -> Self {
        self.operator = operator;
        self
    }

    pub fn operator(&self) -> MatchOperator {
        self.operator
    }

    pub fn synonyms(&self) -> Option<&'a dyn SynonymSource> {
        self.synonyms
    }

    pub fn mappings(&self) -> &'a FieldMappings {
        self.mappings
    }

    pub fn docs(&self) -> &'a DocStore {
        self.docs
    }

    pub fn field_type(&self, field: &str) -> Option<&'a FieldType> {
        self.mappings.get(field)
    }

    /// Analyze query text the way `field` was indexed
    ///
    /// Unmapped fields produce no terms.
    pub fn analyze(&self, field: &str, text: &str, mode_override: Option<AnalyzerMode>) -> Vec<String> {
        match self.field_type(field) {
            Some(field_type) => analyze_for_field(self.analyzer, field_type, text, mode_override),
            None => Vec::new(),
        }
    }

    /// Every live document
    pub fn all_docs(&self) -> RoaringBitmap {
        self.docs.live().clone()
    }

    pub fn posting(&self, field: &str, term: &str) -> Option<&'a Posting> {
        self.index.posting(&token_key(field, term))
    }

    /// Documents whose `field` holds `term`
    pub fn term_docs(&self, field: &str, term: &str) -> RoaringBitmap {
        self.index.doc_set(&token_key(field, term))
    }

    /// Indexed terms of `field` starting with `prefix`, ascending
    pub fn terms_with_prefix(&self, field: &str, prefix: &str) -> Vec<&'a str> {
        self.index
            .tokens_with_prefix(&token_key(field, prefix))
            .into_iter()
            .map(|token| split_token(token).1)
            .collect()
    }

    /// Every indexed term of `field`
    pub fn field_terms(&self, field: &str) -> Vec<&'a str> {
        self.terms_with_prefix(field, "")
    }

    /// Whether every indexed term of `field` is lower-case
    pub fn folds_case(&self, field: &str) -> bool {
        match self.field_type(field) {
            Some(FieldType::Text { analyzer }) => self.analyzer.folds_case(*analyzer),
            Some(field_type) => field_type.is_case_insensitive(),
            None => true,
        }
    }

    /// Indexed terms of `field` equal to the lower-case `term`, ignoring case
    pub fn terms_ignoring_case(&self, field: &str, term: &str) -> Vec<&'a str> {
        if self.folds_case(field) {
            return self
                .terms_with_prefix(field, term)
                .into_iter()
                .filter(|candidate| *candidate == term)
                .collect();
        }
        self.field_terms(field)
            .into_iter()
            .filter(|candidate| candidate.to_lowercase() == term)
            .collect()
    }

    /// Indexed terms of `field` starting with the lower-case `prefix`,
    /// ignoring case
    pub fn terms_with_prefix_ignoring_case(&self, field: &str, prefix: &str) -> Vec<&'a str> {
        if self.folds_case(field) {
            return self.terms_with_prefix(field, prefix);
        }
        self.field_terms(field)
            .into_iter()
            .filter(|candidate| candidate.to_lowercase().starts_with(prefix))
            .collect()
    }

    /// Live documents holding `field`, with its value
    pub fn field_values(&self, field: &str) -> Vec<(DocNo, &'a FieldValue)> {
        self.docs.with_field(field).collect()
    }
}

/// Union of the documents holding any of `terms` in `field`
pub(crate) fn union_term_docs<'t, I>(ctx: &QueryContext<'_>, field: &str, terms: I) -> RoaringBitmap
where
    I: IntoIterator<Item = &'t str>,
{
    let mut docs = RoaringBitmap::new();
    for term in terms {
        docs |= ctx.term_docs(field, term);
    }
    docs
}

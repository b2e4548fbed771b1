//! Multi-match query - one text searched across several fields
//!
//! The text is split into whitespace-separated words. A word is satisfied
//! when any of the fields holds any term the word analyzes to; the
//! operator decides whether every word or any word must be satisfied.

use roaring::RoaringBitmap;
use std::collections::BTreeSet;

use crate::index::token_key;
use crate::query::context::QueryContext;
use crate::query::types::{Clause, MatchOperator};

#[derive(Clone, Debug, PartialEq)]
pub struct MultiMatchQuery {
    pub text: String,
    /// Fields to search; all text fields when empty
    pub fields: Vec<String>,
    pub operator: Option<MatchOperator>,
}

impl MultiMatchQuery {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            fields: Vec::new(),
            operator: None,
        }
    }

    pub fn with_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_operator(mut self, operator: MatchOperator) -> Self {
        self.operator = Some(operator);
        self
    }

    pub fn execute(&self, ctx: &QueryContext<'_>) -> Clause {
        let fields: Vec<&str> = if self.fields.is_empty() {
            ctx.mappings().text_fields()
        } else {
            self.fields.iter().map(String::as_str).collect()
        };

        let operator = self.operator.unwrap_or_else(|| ctx.operator());
        let mut matches: Option<RoaringBitmap> = None;
        let mut tokens = BTreeSet::new();

        for word in self.text.split_whitespace() {
            let mut word_docs = RoaringBitmap::new();
            let mut analyzed_any = false;
            for field in &fields {
                for term in ctx.analyze(field, word, None) {
                    analyzed_any = true;
                    word_docs |= ctx.term_docs(field, &term);
                    tokens.insert(token_key(field, &term));
                }
            }
            // Words that analyze to nothing (stopwords) do not constrain
            if !analyzed_any {
                continue;
            }
            matches = Some(match (matches, operator) {
                (None, _) => word_docs,
                (Some(acc), MatchOperator::And) => acc & word_docs,
                (Some(acc), MatchOperator::Or) => acc | word_docs,
            });
        }

        Clause::terms(matches.unwrap_or_default(), tokens.into_iter().collect())
    }
}

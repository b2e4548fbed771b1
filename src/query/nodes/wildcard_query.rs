//! Wildcard query - matches terms using wildcards
//!
//! Supports:
//! - `*` - matches any sequence of characters
//! - `?` - matches any single character
//!
//! Patterns are case-insensitive and anchored to the whole term.

use regex::Regex;
use tracing::debug;

use crate::index::token_key;
use crate::query::context::{union_term_docs, QueryContext};
use crate::query::types::Clause;

/// Query that matches terms using wildcard patterns
#[derive(Clone, Debug, PartialEq)]
pub struct WildcardQuery {
    /// Field to search in
    pub field: String,
    /// Wildcard pattern
    pub pattern: String,
}

impl WildcardQuery {
    /// Create a new wildcard query
    pub fn new(field: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            pattern: pattern.into(),
        }
    }

    pub fn execute(&self, ctx: &QueryContext<'_>) -> Clause {
        let regex = match pattern_to_regex(&self.pattern) {
            Ok(regex) => regex,
            Err(e) => {
                debug!(pattern = %self.pattern, error = %e, "wildcard pattern rejected");
                return Clause::empty();
            }
        };

        let terms: Vec<&str> = ctx
            .field_terms(&self.field)
            .into_iter()
            .filter(|term| regex.is_match(term))
            .collect();

        let docs = union_term_docs(ctx, &self.field, terms.iter().copied());
        let tokens = terms.iter().map(|t| token_key(&self.field, t)).collect();
        Clause::terms(docs, tokens)
    }
}

/// Convert a wildcard pattern to an anchored, case-insensitive regex
pub fn pattern_to_regex(pattern: &str) -> Result<Regex, regex::Error> {
    let mut regex_pattern = String::with_capacity(pattern.len() + 8);
    regex_pattern.push_str("(?i)^");

    let mut literal = String::new();
    for ch in pattern.chars() {
        match ch {
            '*' | '?' => {
                regex_pattern.push_str(&regex::escape(&literal));
                literal.clear();
                regex_pattern.push_str(if ch == '*' { ".*" } else { "." });
            }
            _ => literal.push(ch),
        }
    }
    regex_pattern.push_str(&regex::escape(&literal));
    regex_pattern.push('$');

    Regex::new(&regex_pattern)
}

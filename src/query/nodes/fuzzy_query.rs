//! Fuzzy query - matches terms within an edit distance
//!
//! Uses Levenshtein distance to find terms that are similar to the query term.
//!
//! # Example
//!
//! ```rust
//! use quarry::query::nodes::FuzzyQuery;
//!
//! // Find terms within edit distance 1 of "roust" (matches "rust")
//! let query = FuzzyQuery::new("content", "roust").with_fuzziness(1);
//! ```

use crate::index::token_key;
use crate::query::context::{union_term_docs, QueryContext};
use crate::query::types::Clause;

/// Default maximum edit distance
pub const DEFAULT_FUZZINESS: u32 = 2;

/// Query that matches terms within an edit distance of the query term
///
/// The edit distance is calculated using Levenshtein distance, counting:
/// - Insertions
/// - Deletions
/// - Substitutions
#[derive(Clone, Debug, PartialEq)]
pub struct FuzzyQuery {
    /// Field to search in
    pub field: String,
    /// Term to match approximately
    pub term: String,
    /// Maximum edit distance; 0 means exact
    pub fuzziness: u32,
}

impl FuzzyQuery {
    /// Create a new fuzzy query with default fuzziness of 2
    pub fn new(field: impl Into<String>, term: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            term: term.into(),
            fuzziness: DEFAULT_FUZZINESS,
        }
    }

    /// Set the maximum edit distance
    pub fn with_fuzziness(mut self, fuzziness: u32) -> Self {
        self.fuzziness = fuzziness;
        self
    }

    pub fn execute(&self, ctx: &QueryContext<'_>) -> Clause {
        let term = self.term.trim().to_lowercase();
        if term.is_empty() {
            return Clause::empty();
        }

        let max = self.fuzziness as usize;
        let term_len = term.chars().count();
        let folds_case = ctx.folds_case(&self.field);
        let terms: Vec<&str> = ctx
            .field_terms(&self.field)
            .into_iter()
            .filter(|candidate| {
                // Lengths further apart than `max` cannot be within reach
                if candidate.chars().count().abs_diff(term_len) > max {
                    return false;
                }
                if folds_case {
                    levenshtein_distance(&term, candidate) <= max
                } else {
                    levenshtein_distance(&term, &candidate.to_lowercase()) <= max
                }
            })
            .collect();

        let docs = union_term_docs(ctx, &self.field, terms.iter().copied());
        let tokens = terms.iter().map(|t| token_key(&self.field, t)).collect();
        Clause::terms(docs, tokens)
    }
}

/// Calculate Levenshtein edit distance between two strings
///
/// Uses the Wagner-Fischer algorithm with O(min(m,n)) space.
pub fn levenshtein_distance(s1: &str, s2: &str) -> usize {
    let s1_chars: Vec<char> = s1.chars().collect();
    let s2_chars: Vec<char> = s2.chars().collect();

    let len1 = s1_chars.len();
    let len2 = s2_chars.len();

    // Early termination for empty strings
    if len1 == 0 {
        return len2;
    }
    if len2 == 0 {
        return len1;
    }

    // Use smaller string for columns to minimize space
    let (shorter, longer) = if len1 <= len2 {
        (&s1_chars, &s2_chars)
    } else {
        (&s2_chars, &s1_chars)
    };

    // Two rows for DP
    let mut prev_row: Vec<usize> = (0..=shorter.len()).collect();
    let mut curr_row = vec![0; shorter.len() + 1];

    for (i, long_ch) in longer.iter().enumerate() {
        curr_row[0] = i + 1;

        for (j, short_ch) in shorter.iter().enumerate() {
            let cost = usize::from(long_ch != short_ch);
            curr_row[j + 1] = (prev_row[j + 1] + 1) // deletion
                .min(curr_row[j] + 1) // insertion
                .min(prev_row[j] + cost); // substitution
        }

        std::mem::swap(&mut prev_row, &mut curr_row);
    }

    prev_row[shorter.len()]
}

//! Phrase query - matches exact phrases with optional proximity/slop
//!
//! A phrase query matches documents containing the analyzed terms in order,
//! allowing at most `slop` intervening positions in total.
//!
//! # Example
//!
//! ```rust
//! use quarry::query::nodes::PhraseQuery;
//!
//! // Exact phrase match
//! let query = PhraseQuery::new("content", "rust programming");
//!
//! // Phrase with slop (allows 2 terms between)
//! let query = PhraseQuery::new("content", "rust programming").with_slop(2);
//! ```

use roaring::RoaringBitmap;
use std::collections::BTreeSet;

use crate::index::{token_key, DocNo};
use crate::query::context::QueryContext;
use crate::query::types::Clause;
use crate::tokenizer::AnalyzerMode;

/// Query that matches an ordered phrase of terms
#[derive(Clone, Debug, PartialEq)]
pub struct PhraseQuery {
    /// Field to search in
    pub field: String,
    /// The phrase to match (will be analyzed)
    pub phrase: String,
    /// Maximum total gap between consecutive terms (default: 0)
    pub slop: u32,
    /// Analyzer override for text fields
    pub analyzer: Option<AnalyzerMode>,
}

impl PhraseQuery {
    /// Create a new phrase query with exact matching (slop=0)
    pub fn new(field: impl Into<String>, phrase: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            phrase: phrase.into(),
            slop: 0,
            analyzer: None,
        }
    }

    /// Set the slop
    ///
    /// - slop=0: exact phrase match (terms must be adjacent)
    /// - slop=1: one term can appear between phrase terms
    /// - slop=2: two terms can appear between phrase terms, etc.
    pub fn with_slop(mut self, slop: u32) -> Self {
        self.slop = slop;
        self
    }

    pub fn with_analyzer(mut self, analyzer: AnalyzerMode) -> Self {
        self.analyzer = Some(analyzer);
        self
    }

    pub fn execute(&self, ctx: &QueryContext<'_>) -> Clause {
        let terms = ctx.analyze(&self.field, &self.phrase, self.analyzer);
        if terms.is_empty() {
            return Clause::empty();
        }

        let mut candidates: Option<RoaringBitmap> = None;
        for term in &terms {
            let docs = ctx.term_docs(&self.field, term);
            candidates = Some(match candidates {
                Some(acc) => acc & docs,
                None => docs,
            });
        }
        let candidates = candidates.unwrap_or_default();

        let matches: RoaringBitmap = if terms.len() == 1 {
            candidates
        } else {
            candidates
                .iter()
                .filter(|&docno| {
                    let doc = DocNo::new(docno);
                    let lists: Option<Vec<&[u32]>> = terms
                        .iter()
                        .map(|term| ctx.posting(&self.field, term).and_then(|p| p.positions(doc)))
                        .collect();
                    lists.map_or(false, |lists| positions_form_phrase(&lists, self.slop))
                })
                .collect()
        };

        let tokens: BTreeSet<String> = terms.iter().map(|t| token_key(&self.field, t)).collect();
        Clause::terms(matches, tokens.into_iter().collect())
    }
}

/// Whether one position can be picked from each list, strictly increasing,
/// with the summed gaps between neighbours at most `slop`
///
/// For a fixed start, taking the earliest position after the previous pick
/// minimizes the end position and so the total gap.
pub fn positions_form_phrase(lists: &[&[u32]], slop: u32) -> bool {
    let (first, rest) = match lists.split_first() {
        Some(split) => split,
        None => return false,
    };

    first.iter().any(|&start| {
        let mut prev = start;
        for positions in rest {
            let idx = positions.partition_point(|&p| p <= prev);
            match positions.get(idx) {
                Some(&next) => prev = next,
                None => return false,
            }
        }
        let span = u64::from(prev - start);
        let gap = span - rest.len() as u64;
        gap <= u64::from(slop)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Document;
    use crate::query::context::test_support::Fixture;
    use crate::schema::FieldMappings;

    #[test]
    fn test_positions_form_phrase() {
        assert!(positions_form_phrase(&[&[0], &[1]], 0));
        assert!(!positions_form_phrase(&[&[0], &[2]], 0));
        assert!(positions_form_phrase(&[&[0], &[2]], 1));
        assert!(!positions_form_phrase(&[&[3], &[1]], 5));
        assert!(positions_form_phrase(&[&[0, 7], &[3, 8], &[9]], 0));
        assert!(positions_form_phrase(&[&[0, 2], &[1, 3]], 0));
        assert!(!positions_form_phrase(&[], 3));
    }

    #[test]
    fn test_repeated_terms_need_distinct_positions() {
        assert!(!positions_form_phrase(&[&[4], &[4]], 2));
        assert!(positions_form_phrase(&[&[4, 5], &[4, 5]], 0));
    }

    fn fixture() -> Fixture {
        let mut fx = Fixture::new(FieldMappings::new());
        fx.add(Document::new("exact").with_field("text", "hello world"));
        fx.add(Document::new("gap").with_field("text", "hello beautiful world"));
        fx.add(Document::new("reversed").with_field("text", "world hello"));
        fx.add(Document::new("far").with_field("text", "hello big wide world"));
        fx
    }

    #[test]
    fn test_slop() {
        let fx = fixture();
        let ctx = fx.ctx();
        let exact = PhraseQuery::new("text", "hello world").execute(&ctx);
        assert_eq!(fx.ids(&exact.matches), vec!["exact"]);

        let slop1 = PhraseQuery::new("text", "hello world").with_slop(1).execute(&ctx);
        assert_eq!(fx.ids(&slop1.matches), vec!["exact", "gap"]);

        let slop2 = PhraseQuery::new("text", "hello world").with_slop(2).execute(&ctx);
        assert_eq!(fx.ids(&slop2.matches), vec!["exact", "gap", "far"]);
    }

    #[test]
    fn test_single_term_and_empty_phrase() {
        let fx = fixture();
        let ctx = fx.ctx();
        assert_eq!(PhraseQuery::new("text", "world").execute(&ctx).len(), 4);
        assert!(PhraseQuery::new("text", "the").execute(&ctx).is_empty());
        assert!(PhraseQuery::new("missing", "hello world").execute(&ctx).is_empty());
    }
}

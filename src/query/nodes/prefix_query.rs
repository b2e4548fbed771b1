//! Prefix query - matches terms with a given prefix
//!
//! A single-word prefix matches any term of the field starting with it. On
//! text fields the words before the last one go through the field's
//! analyzer and must sit at adjacent positions, followed by a term starting
//! with the last word. Keyword-style fields match the whole value as one
//! prefix.

use roaring::RoaringBitmap;
use std::collections::BTreeSet;

use crate::index::{token_key, DocNo};
use crate::query::context::{union_term_docs, QueryContext};
use crate::query::types::Clause;
use crate::schema::FieldType;
use crate::tokenizer::AnalyzerMode;

/// Query that matches documents with terms starting with a prefix
#[derive(Clone, Debug, PartialEq)]
pub struct PrefixQuery {
    /// Field to search in
    pub field: String,
    /// Prefix to match
    pub value: String,
}

impl PrefixQuery {
    /// Create a new prefix query
    pub fn new(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn execute(&self, ctx: &QueryContext<'_>) -> Clause {
        let value = self.value.trim();
        if value.is_empty() {
            return Clause::empty();
        }

        match ctx.field_type(&self.field) {
            Some(FieldType::Text { analyzer }) if *analyzer != AnalyzerMode::Keyword => {
                let (head, prefix) = split_last_word(value);
                let prefix = prefix.to_lowercase();
                if prefix.is_empty() {
                    return Clause::empty();
                }
                let leading = ctx.analyze(&self.field, head, None);
                if leading.is_empty() {
                    self.execute_single(ctx, &prefix)
                } else {
                    self.execute_multi(ctx, &leading, &prefix)
                }
            }
            Some(_) => self.execute_single(ctx, &value.to_lowercase()),
            None => Clause::empty(),
        }
    }

    fn execute_single(&self, ctx: &QueryContext<'_>, prefix: &str) -> Clause {
        let terms = ctx.terms_with_prefix_ignoring_case(&self.field, prefix);
        let docs = union_term_docs(ctx, &self.field, terms.iter().copied());
        let tokens = terms.iter().map(|t| token_key(&self.field, t)).collect();
        Clause::terms(docs, tokens)
    }

    fn execute_multi(&self, ctx: &QueryContext<'_>, leading: &[String], prefix: &str) -> Clause {
        let expansions = ctx.terms_with_prefix_ignoring_case(&self.field, prefix);
        if expansions.is_empty() {
            return Clause::empty();
        }

        // Each leading token may be indexed under several spellings on
        // case-preserving fields
        let mut slots = Vec::with_capacity(leading.len());
        for token in leading {
            let terms = ctx.terms_ignoring_case(&self.field, &token.to_lowercase());
            if terms.is_empty() {
                return Clause::empty();
            }
            slots.push(terms);
        }

        let mut candidates = union_term_docs(ctx, &self.field, expansions.iter().copied());
        for slot in &slots {
            candidates &= union_term_docs(ctx, &self.field, slot.iter().copied());
        }

        let mut matches = RoaringBitmap::new();
        for docno in candidates.iter() {
            let doc = DocNo::new(docno);
            if self.has_adjacent_sequence(ctx, doc, &slots, &expansions) {
                matches.insert(docno);
            }
        }

        let tokens: BTreeSet<String> = slots
            .iter()
            .flatten()
            .chain(expansions.iter())
            .map(|t| token_key(&self.field, t))
            .collect();
        Clause::terms(matches, tokens.into_iter().collect())
    }

    fn positions(&self, ctx: &QueryContext<'_>, doc: DocNo, terms: &[&str]) -> BTreeSet<u32> {
        let mut positions = BTreeSet::new();
        for term in terms {
            if let Some(found) = ctx.posting(&self.field, term).and_then(|p| p.positions(doc)) {
                positions.extend(found.iter().copied());
            }
        }
        positions
    }

    /// Leading slots at positions `p, p+1, ...` and an expansion right after
    fn has_adjacent_sequence(
        &self,
        ctx: &QueryContext<'_>,
        doc: DocNo,
        slots: &[Vec<&str>],
        expansions: &[&str],
    ) -> bool {
        let slot_positions: Vec<BTreeSet<u32>> =
            slots.iter().map(|slot| self.positions(ctx, doc, slot)).collect();
        let tail_positions = self.positions(ctx, doc, expansions);

        slot_positions[0].iter().any(|&start| {
            let in_order = slot_positions
                .iter()
                .enumerate()
                .skip(1)
                .all(|(offset, positions)| positions.contains(&(start + offset as u32)));
            in_order && tail_positions.contains(&(start + slot_positions.len() as u32))
        })
    }
}

/// Splits `value` before its last word, dropping trailing punctuation
///
/// `"Rust, prog!"` gives `("Rust,", "prog")` and a value with no word
/// boundary is all prefix.
fn split_last_word(value: &str) -> (&str, &str) {
    let is_word = |c: char| c.is_alphanumeric() || c == '_';
    let value = value.trim_end_matches(|c: char| !is_word(c));
    match value.char_indices().rev().find(|(_, c)| !is_word(*c)) {
        Some((i, c)) => (&value[..i], &value[i + c.len_utf8()..]),
        None => ("", value),
    }
}

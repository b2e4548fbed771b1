//! Ranking pipeline: score matched documents, order them, cut a page
//!
//! Shards rank locally and keep only their top `from + size` hits; the merge
//! re-sorts the union under the same total order, so the merged page is the
//! page an unsharded engine would return.

use roaring::RoaringBitmap;
use std::cmp::Ordering;
use std::collections::HashMap;
use tracing::warn;

use super::facets::merge_counts;
use super::scoring::{ScoreInput, Scorer};
use super::statistics::{CorpusStats, DocLengths};
use crate::config::EngineSettings;
use crate::index::{split_token, DocNo, TokenIndex};
use crate::models::{FacetCounts, SearchHit, SearchResponse};
use crate::query::{Clause, ScoreKind};

/// A matched document and its score, before materialization
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct ScoredDoc {
    pub docno: DocNo,
    pub score: f32,
    pub seq: u64,
}

/// One engine's share of a search, ranked and truncated
#[derive(Clone, Debug, Default)]
pub(crate) struct PartialResult {
    pub hits: Vec<SearchHit>,
    pub total: u64,
    pub facets: FacetCounts,
}

/// Scores documents of a clause against one engine's index
pub(crate) struct Ranker<'a> {
    pub index: &'a dyn TokenIndex,
    pub lengths: &'a DocLengths,
    pub stats: &'a dyn CorpusStats,
    pub scorer: &'a dyn Scorer,
    pub settings: &'a EngineSettings,
}

impl Ranker<'_> {
    /// Sum every score source over the documents it covers
    ///
    /// A document whose scoring fails anywhere scores 0.
    pub fn score(&self, clause: &Clause) -> HashMap<u32, f32> {
        let mut scores: HashMap<u32, f32> = HashMap::new();
        let mut failed = RoaringBitmap::new();
        let total_docs = self.stats.total_docs();
        let avg_doc_len = self.stats.avg_doc_length();

        for source in &clause.sources {
            match &source.kind {
                ScoreKind::Constant(value) => {
                    for doc in &source.docs {
                        *scores.entry(doc).or_insert(0.0) += *value;
                    }
                }
                ScoreKind::Terms(tokens) => {
                    for token in tokens {
                        let Some(posting) = self.index.posting(token) else {
                            continue;
                        };
                        let df = self.stats.document_frequency(token);
                        let field = split_token(token).0;
                        let field_boost = self.settings.field_boost(field);

                        for doc in &source.docs {
                            let docno = DocNo::new(doc);
                            let tf = posting.term_frequency(docno);
                            if tf == 0 {
                                continue;
                            }
                            let input = ScoreInput {
                                token: token.as_str(),
                                field,
                                tf,
                                df,
                                total_docs,
                                doc_len: self.lengths.get(docno),
                                avg_doc_len,
                                field_boost,
                            };
                            match self.scorer.score(&input) {
                                Ok(score) => *scores.entry(doc).or_insert(0.0) += score,
                                Err(e) => {
                                    warn!(doc = %docno, token = %token, error = %e, "scorer failed, document scores 0");
                                    failed.insert(doc);
                                }
                            }
                        }
                    }
                }
            }
        }

        for doc in &failed {
            scores.insert(doc, 0.0);
        }
        scores
    }
}

/// Score descending, then insertion sequence ascending
pub(crate) fn scored_order(a: &ScoredDoc, b: &ScoredDoc) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| a.seq.cmp(&b.seq))
}

/// Score descending, then source index, then insertion sequence
pub(crate) fn hit_order(a: &SearchHit, b: &SearchHit) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| a.origin.cmp(&b.origin))
        .then_with(|| a.seq.cmp(&b.seq))
}

/// Keep the first `window` items under `order`, sorted
pub(crate) fn top_window<T, F>(items: &mut Vec<T>, window: usize, mut order: F)
where
    F: FnMut(&T, &T) -> Ordering,
{
    if window == 0 {
        items.clear();
        return;
    }
    if items.len() > window {
        items.select_nth_unstable_by(window - 1, &mut order);
        items.truncate(window);
    }
    items.sort_by(order);
}

/// Slice a page out of a ranked list; a `from` past the end yields nothing
pub(crate) fn paginate<T>(items: Vec<T>, from: usize, size: usize) -> Vec<T> {
    items.into_iter().skip(from).take(size).collect()
}

/// Merge ranked partial results into one page
pub(crate) fn merge(partials: Vec<PartialResult>, from: usize, size: usize) -> SearchResponse {
    let mut hits = Vec::new();
    let mut total = 0;
    let mut facets = FacetCounts::new();
    for partial in partials {
        hits.extend(partial.hits);
        total += partial.total;
        merge_counts(&mut facets, partial.facets);
    }
    top_window(&mut hits, from.saturating_add(size), hit_order);

    SearchResponse {
        hits: paginate(hits, from, size),
        total,
        from,
        size,
        facets,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::scoring::Bm25Scorer;
    use crate::engine::statistics::LocalStats;
    use crate::error::{QuarryError, Result};
    use crate::index::InvertedIndex;

    fn hit(id: &str, score: f32, seq: u64) -> SearchHit {
        SearchHit::new(id, score).with_seq(seq)
    }

    #[test]
    fn test_top_window_and_paginate() {
        let mut items = vec![5, 1, 4, 2, 3];
        top_window(&mut items, 3, |a: &i32, b: &i32| a.cmp(b));
        assert_eq!(items, vec![1, 2, 3]);
        assert_eq!(paginate(items.clone(), 1, 5), vec![2, 3]);
        assert!(paginate(items, 10, 5).is_empty());

        let mut none = vec![1, 2];
        top_window(&mut none, 0, |a: &i32, b: &i32| a.cmp(b));
        assert!(none.is_empty());
    }

    #[test]
    fn test_ties_break_by_sequence() {
        let a = ScoredDoc {
            docno: DocNo::new(7),
            score: 1.0,
            seq: 2,
        };
        let b = ScoredDoc {
            docno: DocNo::new(3),
            score: 1.0,
            seq: 1,
        };
        assert_eq!(scored_order(&a, &b), Ordering::Greater);
        assert_eq!(hit_order(&hit("x", 2.0, 9), &hit("y", 1.0, 0)), Ordering::Less);
    }

    #[test]
    fn test_merge_sums_totals_and_facets() {
        let mut left_facets = FacetCounts::new();
        left_facets
            .entry("brand".to_string())
            .or_default()
            .insert("acme".to_string(), 1);
        let left = PartialResult {
            hits: vec![hit("a", 3.0, 0), hit("c", 1.0, 2)],
            total: 2,
            facets: left_facets.clone(),
        };
        let right = PartialResult {
            hits: vec![hit("b", 2.0, 1), hit("d", 1.0, 3)],
            total: 2,
            facets: left_facets,
        };

        let response = merge(vec![left, right], 1, 2);
        assert_eq!(response.ids(), vec!["b", "c"]);
        assert_eq!(response.total, 4);
        assert_eq!(response.facets["brand"]["acme"], 2);
    }

    struct Failing;

    impl Scorer for Failing {
        fn score(&self, input: &ScoreInput<'_>) -> Result<f32> {
            if input.doc_len == Some(1) {
                Err(QuarryError::Scorer("boom".to_string()))
            } else {
                Ok(1.0)
            }
        }
    }

    #[test]
    fn test_scorer_failure_zeroes_one_document() {
        let mut index = InvertedIndex::new();
        let mut lengths = DocLengths::new();
        index.add_token("body:rust", DocNo::new(0), 0);
        index.add_token("body:rust", DocNo::new(1), 0);
        lengths.insert(DocNo::new(0), 1);
        lengths.insert(DocNo::new(1), 2);

        let settings = EngineSettings::default();
        let stats = LocalStats::new(&index, &lengths);
        let ranker = Ranker {
            index: &index,
            lengths: &lengths,
            stats: &stats,
            scorer: &Failing,
            settings: &settings,
        };
        let matches: RoaringBitmap = [0, 1].into_iter().collect();
        let clause = Clause::terms(matches, vec!["body:rust".to_string()]);
        let scores = ranker.score(&clause);
        assert_eq!(scores[&0], 0.0);
        assert_eq!(scores[&1], 1.0);

        let bm25 = Bm25Scorer::default();
        let ranker = Ranker {
            scorer: &bm25,
            ..ranker
        };
        let scores = ranker.score(&clause);
        // Shorter document wins on equal tf
        assert!(scores[&0] > scores[&1]);
    }
}

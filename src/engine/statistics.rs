//! Corpus statistics for BM25 scoring
//!
//! Each engine keeps a document-length table. Scoring reads `N`, `df` and
//! `avgdl` through [`CorpusStats`], so a sharded engine can hand every shard
//! the summed statistics of all shards and get the scores an unsharded
//! engine would produce.

use std::collections::HashMap;

use crate::index::{DocNo, TokenIndex};

/// Document lengths (tokens written per document) and their running total
#[derive(Clone, Debug, Default)]
pub struct DocLengths {
    lengths: HashMap<DocNo, u32>,
    total: u64,
}

impl DocLengths {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, docno: DocNo, length: u32) {
        if let Some(previous) = self.lengths.insert(docno, length) {
            self.total -= previous as u64;
        }
        self.total += length as u64;
    }

    pub fn remove(&mut self, docno: DocNo) -> Option<u32> {
        let length = self.lengths.remove(&docno)?;
        self.total -= length as u64;
        Some(length)
    }

    pub fn get(&self, docno: DocNo) -> Option<u32> {
        self.lengths.get(&docno).copied()
    }

    pub fn len(&self) -> usize {
        self.lengths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lengths.is_empty()
    }

    /// Sum of all document lengths
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Mean document length, 0 when empty
    pub fn average(&self) -> f32 {
        average(self.total, self.lengths.len() as u64)
    }

    pub fn clear(&mut self) {
        self.lengths.clear();
        self.total = 0;
    }
}

fn average(total_length: u64, count: u64) -> f32 {
    if count == 0 {
        0.0
    } else {
        (total_length as f64 / count as f64) as f32
    }
}

/// Collection-wide statistics read by the scorer
pub trait CorpusStats: Sync {
    /// Number of live documents (`N`)
    fn total_docs(&self) -> u64;

    /// Sum of all document lengths
    fn total_length(&self) -> u64;

    /// Documents containing `token` (`df`)
    fn document_frequency(&self, token: &str) -> u64;

    fn avg_doc_length(&self) -> f32 {
        average(self.total_length(), self.total_docs())
    }
}

/// Statistics of a single engine
#[derive(Clone, Copy)]
pub struct LocalStats<'a> {
    index: &'a dyn TokenIndex,
    lengths: &'a DocLengths,
}

impl<'a> LocalStats<'a> {
    pub fn new(index: &'a dyn TokenIndex, lengths: &'a DocLengths) -> Self {
        Self { index, lengths }
    }
}

impl CorpusStats for LocalStats<'_> {
    fn total_docs(&self) -> u64 {
        self.lengths.len() as u64
    }

    fn total_length(&self) -> u64 {
        self.lengths.total()
    }

    fn document_frequency(&self, token: &str) -> u64 {
        self.index.document_frequency(token)
    }
}

/// Statistics summed over the shards of one index
pub struct MergedStats<'a> {
    shards: Vec<LocalStats<'a>>,
    total_docs: u64,
    total_length: u64,
}

impl<'a> MergedStats<'a> {
    pub fn new(shards: Vec<LocalStats<'a>>) -> Self {
        let total_docs = shards.iter().map(CorpusStats::total_docs).sum();
        let total_length = shards.iter().map(CorpusStats::total_length).sum();
        Self {
            shards,
            total_docs,
            total_length,
        }
    }
}

impl CorpusStats for MergedStats<'_> {
    fn total_docs(&self) -> u64 {
        self.total_docs
    }

    fn total_length(&self) -> u64 {
        self.total_length
    }

    fn document_frequency(&self, token: &str) -> u64 {
        self.shards
            .iter()
            .map(|shard| shard.document_frequency(token))
            .sum()
    }
}

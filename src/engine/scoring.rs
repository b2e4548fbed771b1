/// Scoring functions for search operations
use crate::config::Bm25Params;
use crate::error::Result;

/// Everything a scorer sees for one (token, document) pair
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScoreInput<'a> {
    /// The `field:term` index key
    pub token: &'a str,
    pub field: &'a str,
    /// Occurrences of the token in the document
    pub tf: u32,
    /// Documents containing the token
    pub df: u64,
    pub total_docs: u64,
    /// Tokens in the document; `None` for an unknown document
    pub doc_len: Option<u32>,
    pub avg_doc_len: f32,
    pub field_boost: f32,
}

/// Relevance function for one matched token in one document
///
/// A failing scorer does not abort the search; the document scores 0.
pub trait Scorer: Send + Sync {
    fn score(&self, input: &ScoreInput<'_>) -> Result<f32>;
}

/// Okapi BM25 with per-field boosts
#[derive(Clone, Copy, Debug, Default)]
pub struct Bm25Scorer {
    params: Bm25Params,
}

impl Bm25Scorer {
    pub fn new(params: Bm25Params) -> Self {
        Self { params }
    }

    pub fn params(&self) -> Bm25Params {
        self.params
    }
}

impl Scorer for Bm25Scorer {
    fn score(&self, input: &ScoreInput<'_>) -> Result<f32> {
        let Some(doc_len) = input.doc_len else {
            return Ok(0.0);
        };
        if input.df == 0 {
            return Ok(0.0);
        }
        Ok(input.field_boost
            * bm25_score(
                input.tf as f32,
                input.df as f32,
                input.total_docs as f32,
                doc_len as f32,
                input.avg_doc_len,
                &self.params,
            ))
    }
}

/// Compute BM25 score for a term in a document
///
/// # Arguments
/// * `tf` - Term frequency in document
/// * `df` - Document frequency (how many documents contain the term)
/// * `total_docs` - Total number of documents in the index
/// * `doc_len` - Length of the document (in tokens)
/// * `avg_doc_len` - Average document length; 1 is used when it is 0
///
/// # Returns
/// BM25 relevance score
pub fn bm25_score(
    tf: f32,
    df: f32,
    total_docs: f32,
    doc_len: f32,
    avg_doc_len: f32,
    params: &Bm25Params,
) -> f32 {
    let avg_doc_len = if avg_doc_len > 0.0 { avg_doc_len } else { 1.0 };
    let doc_len = doc_len.max(0.0);

    // Inverse document frequency
    let idf = ((total_docs - df + 0.5) / (df + 0.5) + 1.0).ln();

    // Length normalization
    let norm = 1.0 - params.b + params.b * (doc_len / avg_doc_len);

    idf * (tf * (params.k1 + 1.0)) / (tf + params.k1 * norm)
}

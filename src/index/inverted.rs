use std::collections::BTreeMap;

use super::postings::Posting;
use super::{DocNo, TokenIndex};

/// Single-shard positional inverted index: token → posting
///
/// Tokens are kept ordered so prefix scans over one field's terms are range
/// reads. Postings left empty by removals are dropped.
#[derive(Clone, Debug, Default)]
pub struct InvertedIndex {
    postings: BTreeMap<String, Posting>,
}

impl InvertedIndex {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenIndex for InvertedIndex {
    fn add_token(&mut self, token: &str, doc: DocNo, position: u32) {
        match self.postings.get_mut(token) {
            Some(posting) => posting.add(doc, position),
            None => {
                let mut posting = Posting::new();
                posting.add(doc, position);
                self.postings.insert(token.to_string(), posting);
            }
        }
    }

    fn remove_token(&mut self, token: &str, doc: DocNo) {
        let now_empty = match self.postings.get_mut(token) {
            Some(posting) => {
                posting.remove(doc);
                posting.is_empty()
            }
            None => false,
        };
        if now_empty {
            self.postings.remove(token);
        }
    }

    fn posting(&self, token: &str) -> Option<&Posting> {
        self.postings.get(token)
    }

    fn tokens_with_prefix(&self, prefix: &str) -> Vec<&str> {
        self.postings
            .range::<str, _>((std::ops::Bound::Included(prefix), std::ops::Bound::Unbounded))
            .map(|(token, _)| token.as_str())
            .take_while(|token| token.starts_with(prefix))
            .collect()
    }

    fn token_count(&self) -> usize {
        self.postings.len()
    }

    fn clear(&mut self) {
        self.postings.clear();
    }
}

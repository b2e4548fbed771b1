//! Positional inverted index, single-shard and token-sharded

mod doc_store;
mod inverted;
mod postings;
pub mod routing;
mod sharded;

pub use doc_store::{DocStore, StoredDocument};
pub use inverted::InvertedIndex;
pub use postings::Posting;
pub use routing::shard_for;
pub use sharded::ShardedInvertedIndex;

use roaring::RoaringBitmap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Dense internal document number, assigned per engine
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DocNo(pub u32);

impl DocNo {
    pub fn new(n: u32) -> Self {
        Self(n)
    }

    pub fn as_u32(self) -> u32 {
        self.0
    }
}

impl fmt::Display for DocNo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Build the `field:term` index key
pub fn token_key(field: &str, term: &str) -> String {
    let mut key = String::with_capacity(field.len() + term.len() + 1);
    key.push_str(field);
    key.push(':');
    key.push_str(term);
    key
}

/// Split an index key into field and term
///
/// Field names never contain `:`, so the first separator is authoritative.
pub fn split_token(token: &str) -> (&str, &str) {
    token.split_once(':').unwrap_or((token, ""))
}

/// Contract shared by the single and token-sharded inverted indexes
pub trait TokenIndex: Send + Sync {
    /// Record an occurrence; positions stay sorted and unique
    fn add_token(&mut self, token: &str, doc: DocNo, position: u32);

    /// Remove `doc` from the token's posting
    fn remove_token(&mut self, token: &str, doc: DocNo);

    fn posting(&self, token: &str) -> Option<&Posting>;

    /// Indexed tokens starting with `prefix`, in ascending order
    fn tokens_with_prefix(&self, prefix: &str) -> Vec<&str>;

    /// Number of distinct tokens
    fn token_count(&self) -> usize;

    fn clear(&mut self);

    fn document_frequency(&self, token: &str) -> u64 {
        self.posting(token)
            .map_or(0, |p| p.document_frequency() as u64)
    }

    fn term_frequency(&self, token: &str, doc: DocNo) -> u32 {
        self.posting(token).map_or(0, |p| p.term_frequency(doc))
    }

    /// Documents containing the token
    fn doc_set(&self, token: &str) -> RoaringBitmap {
        self.posting(token)
            .map(Posting::to_bitmap)
            .unwrap_or_default()
    }
}

/// Build the index implementation for a token shard count
pub fn new_token_index(token_shards: usize) -> Box<dyn TokenIndex> {
    if token_shards <= 1 {
        Box::new(InvertedIndex::new())
    } else {
        Box::new(ShardedInvertedIndex::new(token_shards))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_key_round_trip() {
        let key = token_key("url", "https://example.com");
        assert_eq!(key, "url:https://example.com");
        assert_eq!(split_token(&key), ("url", "https://example.com"));
        assert_eq!(split_token("bare"), ("bare", ""));
    }

    #[test]
    fn test_new_token_index() {
        let mut index = new_token_index(3);
        index.add_token("f:x", DocNo::new(0), 0);
        assert_eq!(index.document_frequency("f:x"), 1);
        assert_eq!(new_token_index(1).token_count(), 0);
    }
}

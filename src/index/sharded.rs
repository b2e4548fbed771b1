use super::inverted::InvertedIndex;
use super::postings::Posting;
use super::routing::shard_for;
use super::{DocNo, TokenIndex};

/// Inverted index partitioned by token hash
///
/// Every token lives in exactly one shard, so each read routes to a single
/// sub-index. A single shard behaves exactly like [`InvertedIndex`].
#[derive(Clone, Debug)]
pub struct ShardedInvertedIndex {
    shards: Vec<InvertedIndex>,
}

impl ShardedInvertedIndex {
    pub fn new(num_shards: usize) -> Self {
        let num_shards = num_shards.max(1);
        Self {
            shards: (0..num_shards).map(|_| InvertedIndex::new()).collect(),
        }
    }

    pub fn num_shards(&self) -> usize {
        self.shards.len()
    }

    pub fn shard_of(&self, token: &str) -> usize {
        shard_for(token, self.shards.len())
    }

    /// Tokens held by one shard
    pub fn shard_token_count(&self, shard: usize) -> usize {
        self.shards.get(shard).map_or(0, |s| s.token_count())
    }

    fn shard(&self, token: &str) -> &InvertedIndex {
        &self.shards[self.shard_of(token)]
    }

    fn shard_mut(&mut self, token: &str) -> &mut InvertedIndex {
        let idx = self.shard_of(token);
        &mut self.shards[idx]
    }
}

impl TokenIndex for ShardedInvertedIndex {
    fn add_token(&mut self, token: &str, doc: DocNo, position: u32) {
        self.shard_mut(token).add_token(token, doc, position);
    }

    fn remove_token(&mut self, token: &str, doc: DocNo) {
        self.shard_mut(token).remove_token(token, doc);
    }

    fn posting(&self, token: &str) -> Option<&Posting> {
        self.shard(token).posting(token)
    }

    fn tokens_with_prefix(&self, prefix: &str) -> Vec<&str> {
        let mut tokens: Vec<&str> = self
            .shards
            .iter()
            .flat_map(|shard| shard.tokens_with_prefix(prefix))
            .collect();
        tokens.sort_unstable();
        tokens
    }

    fn token_count(&self) -> usize {
        self.shards.iter().map(TokenIndex::token_count).sum()
    }

    fn clear(&mut self) {
        self.shards.iter_mut().for_each(TokenIndex::clear);
    }
}

//! Search engine: indexing, BM25 ranking, facets and snapshots for one shard

mod facets;
mod ranking;
mod scoring;
mod search_engine;
mod snapshot;
mod statistics;

pub use facets::{merge_counts, FacetIndex};
pub use scoring::{bm25_score, Bm25Scorer, ScoreInput, Scorer};
pub use search_engine::SearchEngine;
pub use snapshot::{EngineSnapshot, SnapshotDocument, SNAPSHOT_VERSION};
pub use statistics::{CorpusStats, DocLengths, LocalStats, MergedStats};

pub(crate) use ranking::{merge, PartialResult};

pub mod cluster;
pub mod config;
pub mod engine;
pub mod error;
pub mod index;
pub mod models;
pub mod persistence;
pub mod query;
pub mod schema;
pub mod tokenizer;

pub use cluster::{IndexTarget, SearchCluster, ShardedSearchEngine};
pub use config::{AnalysisConfig, Bm25Params, CustomAnalyzerConfig, EngineSettings};
pub use engine::{Bm25Scorer, EngineSnapshot, ScoreInput, Scorer, SearchEngine};
pub use error::{QuarryError, Result};
pub use models::*;
pub use persistence::{
    FileSnapshotStore, FileWal, JsonMappingStore, MappingStore, SnapshotStore, WalEntry,
    WriteAheadLog,
};
pub use query::{Query, QueryParser};
pub use schema::{FieldMappings, FieldType};
pub use tokenizer::{Analyzer, AnalyzerMode};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

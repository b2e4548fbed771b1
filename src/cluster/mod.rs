//! Horizontal partitioning: id-sharded indices and a registry of named indices

mod registry;
mod sharded;

pub use registry::{IndexTarget, SearchCluster};
pub use sharded::ShardedSearchEngine;

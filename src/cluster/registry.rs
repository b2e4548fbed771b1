use parking_lot::RwLock;
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::info;

use super::sharded::ShardedSearchEngine;
use crate::config::EngineSettings;
use crate::engine::{merge, PartialResult};
use crate::error::{QuarryError, Result};
use crate::models::{Document, SearchOptions, SearchResponse};
use crate::query::Query;

/// Which indices an operation addresses
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IndexTarget {
    Named(String),
    All,
}

impl IndexTarget {
    pub fn named(name: impl Into<String>) -> Self {
        IndexTarget::Named(name.into())
    }
}

impl fmt::Display for IndexTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexTarget::Named(name) => f.write_str(name),
            IndexTarget::All => f.write_str("_all"),
        }
    }
}

struct IndexEntry {
    // Creation order, the tie-break between indices
    ordinal: usize,
    engine: Arc<ShardedSearchEngine>,
}

/// Named, independently sharded indices searched alone or together
#[derive(Default)]
pub struct SearchCluster {
    indices: RwLock<BTreeMap<String, IndexEntry>>,
    next_ordinal: AtomicUsize,
}

impl SearchCluster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_index(
        &self,
        name: impl Into<String>,
        shards: usize,
        settings: EngineSettings,
    ) -> Result<Arc<ShardedSearchEngine>> {
        let name = name.into();
        if name.is_empty() || name.starts_with('_') {
            return Err(QuarryError::InvalidConfig(format!(
                "invalid index name `{name}`"
            )));
        }
        let mut indices = self.indices.write();
        if indices.contains_key(&name) {
            return Err(QuarryError::IndexExists(name));
        }
        let engine = Arc::new(ShardedSearchEngine::new(shards, settings)?);

        let ordinal = self.next_ordinal.fetch_add(1, Ordering::SeqCst);
        indices.insert(
            name.clone(),
            IndexEntry {
                ordinal,
                engine: engine.clone(),
            },
        );
        info!(index = %name, shards, "index created");
        Ok(engine)
    }

    /// Remove an index; `false` when it did not exist
    pub fn drop_index(&self, name: &str) -> bool {
        let dropped = self.indices.write().remove(name).is_some();
        if dropped {
            info!(index = %name, "index dropped");
        }
        dropped
    }

    /// Index names in creation order
    pub fn index_names(&self) -> Vec<String> {
        let indices = self.indices.read();
        let mut names: Vec<(&String, usize)> = indices
            .iter()
            .map(|(name, entry)| (name, entry.ordinal))
            .collect();
        names.sort_by_key(|(_, ordinal)| *ordinal);
        names.into_iter().map(|(name, _)| name.clone()).collect()
    }

    pub fn index(&self, name: &str) -> Result<Arc<ShardedSearchEngine>> {
        self.indices
            .read()
            .get(name)
            .map(|entry| entry.engine.clone())
            .ok_or_else(|| QuarryError::UnknownIndex(name.to_string()))
    }

    /// Resolve a target to (name, ordinal, engine) triples
    fn targets(&self, target: &IndexTarget) -> Result<Vec<(String, usize, Arc<ShardedSearchEngine>)>> {
        let indices = self.indices.read();
        match target {
            IndexTarget::Named(name) => indices
                .get(name)
                .map(|entry| vec![(name.clone(), entry.ordinal, entry.engine.clone())])
                .ok_or_else(|| QuarryError::UnknownIndex(name.clone())),
            IndexTarget::All => Ok(indices
                .iter()
                .map(|(name, entry)| (name.clone(), entry.ordinal, entry.engine.clone()))
                .collect()),
        }
    }

    /// Add a document to every targeted index
    pub fn add(&self, target: &IndexTarget, doc: Document) -> Result<()> {
        for (_, _, engine) in self.targets(target)? {
            engine.add(doc.clone())?;
        }
        Ok(())
    }

    /// Delete from every targeted index; `true` when any held the document
    pub fn delete(&self, target: &IndexTarget, id: &str) -> Result<bool> {
        let mut deleted = false;
        for (_, _, engine) in self.targets(target)? {
            deleted |= engine.delete(id)?;
        }
        Ok(deleted)
    }

    /// Search one index, or every index with merged ranking
    ///
    /// Hits from an all-indices search carry their index name.
    pub fn search(
        &self,
        target: &IndexTarget,
        query: &Query,
        options: &SearchOptions,
    ) -> Result<SearchResponse> {
        if let IndexTarget::Named(name) = target {
            return Ok(self.index(name)?.search(query, options));
        }

        let targets = self.targets(target)?;
        let size = options.size.unwrap_or_else(|| {
            targets
                .first()
                .map_or(EngineSettings::default().default_page_size, |(_, _, engine)| {
                    engine.page_size(options)
                })
        });
        let window = options.from.saturating_add(size);

        let partials: Vec<PartialResult> = targets
            .par_iter()
            .map(|(name, ordinal, engine)| {
                let mut partial = engine.search_partial(query, options, window);
                for hit in &mut partial.hits {
                    hit.index = Some(name.clone());
                    hit.origin = *ordinal;
                }
                partial
            })
            .collect();
        Ok(merge(partials, options.from, size))
    }
}

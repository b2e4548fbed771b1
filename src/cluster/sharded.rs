use parking_lot::RwLock;
use rayon::prelude::*;
use serde_json::Value;
use std::sync::atomic::AtomicU64;
use std::sync::Arc;
use tracing::debug;

use crate::config::EngineSettings;
use crate::engine::{
    merge, EngineSnapshot, LocalStats, MergedStats, PartialResult, SearchEngine, SNAPSHOT_VERSION,
};
use crate::error::{QuarryError, Result};
use crate::index::shard_for;
use crate::models::{Document, SearchOptions, SearchResponse};
use crate::query::{Query, QueryParser};
use crate::schema::{FieldMappings, FieldType};

/// An index split over independent engines by document id
///
/// Every shard scores with the statistics of the whole index, so results
/// match an unsharded engine holding the same documents.
pub struct ShardedSearchEngine {
    shards: Vec<RwLock<SearchEngine>>,
    // Locked before any shard
    mappings: RwLock<FieldMappings>,
    settings: EngineSettings,
}

impl ShardedSearchEngine {
    pub fn new(shard_count: usize, settings: EngineSettings) -> Result<Self> {
        Self::with_shard_config(shard_count, settings, |engine| engine)
    }

    /// Build shards, letting `configure` install collaborators on each
    pub fn with_shard_config<F>(
        shard_count: usize,
        settings: EngineSettings,
        mut configure: F,
    ) -> Result<Self>
    where
        F: FnMut(SearchEngine) -> SearchEngine,
    {
        if shard_count == 0 {
            return Err(QuarryError::InvalidConfig(
                "shard count must be at least 1".to_string(),
            ));
        }
        let sequence = Arc::new(AtomicU64::new(0));
        let shards = (0..shard_count)
            .map(|_| {
                let engine = SearchEngine::new(settings.clone())?.with_sequence(sequence.clone());
                Ok(RwLock::new(configure(engine)))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            shards,
            mappings: RwLock::new(FieldMappings::new()),
            settings,
        })
    }

    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Shard owning document `id`
    pub fn shard_of(&self, id: &str) -> usize {
        shard_for(id, self.shards.len())
    }

    /// Declare a field type on every shard
    pub fn put_mapping(&self, field: &str, field_type: FieldType) -> Result<bool> {
        let mut mappings = self.mappings.write();
        let added = mappings.put(field, field_type.clone())?;
        for shard in &self.shards {
            shard.write().put_mapping(field, field_type.clone())?;
        }
        Ok(added)
    }

    pub fn mapping(&self, field: &str) -> Option<FieldType> {
        self.mappings.read().get(field).cloned()
    }

    /// Index-wide mapping table
    pub fn mappings(&self) -> FieldMappings {
        self.mappings.read().clone()
    }

    /// Index a document on its shard
    ///
    /// Field types are resolved against the whole index, so a field keeps one
    /// type across shards.
    pub fn add(&self, doc: Document) -> Result<()> {
        let mut mappings = self.mappings.write();
        doc.validate()?;
        let inferred = self.resolve(&mappings, &doc)?;

        let mut shard = self.shards[self.shard_of(&doc.id)].write();
        Self::push_mappings(&mappings, &mut shard, &doc)?;
        shard.add(doc)?;
        mappings.apply(inferred);
        Ok(())
    }

    pub fn add_json(&self, value: &Value) -> Result<()> {
        self.add(Document::from_json(value)?)
    }

    /// Index a batch, shards in parallel
    ///
    /// Documents are validated in batch order first; everything before the
    /// first invalid document is indexed and that document's error returned.
    pub fn add_batch<I>(&self, docs: I) -> Result<usize>
    where
        I: IntoIterator<Item = Document>,
    {
        let mut mappings = self.mappings.write();
        let mut working = mappings.clone();
        let mut groups: Vec<Vec<Document>> = vec![Vec::new(); self.shards.len()];
        let mut rejected = None;
        for doc in docs {
            let inferred = doc.validate().and_then(|_| self.resolve(&working, &doc));
            match inferred {
                Ok(inferred) => {
                    working.apply(inferred);
                    let shard = self.shard_of(&doc.id);
                    groups[shard].push(doc);
                }
                Err(e) => {
                    rejected = Some(e);
                    break;
                }
            }
        }

        let results: Vec<Result<usize>> = self
            .shards
            .par_iter()
            .zip(groups)
            .map(|(shard, group)| {
                if group.is_empty() {
                    return Ok(0);
                }
                let mut shard = shard.write();
                for doc in &group {
                    Self::push_mappings(&working, &mut shard, doc)?;
                }
                shard.add_batch(group)
            })
            .collect();
        *mappings = working;

        let mut added = 0;
        for result in results {
            added += result?;
        }
        debug!(added, shards = self.shards.len(), "batch indexed");
        match rejected {
            Some(e) => Err(e),
            None => Ok(added),
        }
    }

    fn resolve(&self, mappings: &FieldMappings, doc: &Document) -> Result<Vec<(String, FieldType)>> {
        mappings.resolve(
            doc,
            self.settings.analysis.default_mode,
            self.settings.date_detection,
        )
    }

    /// Give `shard` the index-wide type of every field `doc` carries
    fn push_mappings(mappings: &FieldMappings, shard: &mut SearchEngine, doc: &Document) -> Result<()> {
        for field in doc.fields.keys() {
            if let Some(field_type) = mappings.get(field) {
                shard.put_mapping(field.as_str(), field_type.clone())?;
            }
        }
        Ok(())
    }

    pub fn delete(&self, id: &str) -> Result<bool> {
        let shard = self.shard_of(id);
        self.shards[shard].write().delete(id)
    }

    pub fn get(&self, id: &str) -> Option<Document> {
        self.shards[self.shard_of(id)].read().get(id).cloned()
    }

    pub fn total_docs(&self) -> u64 {
        self.shards.iter().map(|shard| shard.read().total_docs()).sum()
    }

    /// Documents per shard
    pub fn shard_sizes(&self) -> Vec<u64> {
        self.shards.iter().map(|shard| shard.read().total_docs()).collect()
    }

    /// Run a query on every shard and merge one ranked page
    pub fn search(&self, query: &Query, options: &SearchOptions) -> SearchResponse {
        let size = self.page_size(options);
        let partial = self.search_partial(query, options, options.from.saturating_add(size));
        merge(vec![partial], options.from, size)
    }

    pub fn search_json(&self, query: &Value, options: &SearchOptions) -> SearchResponse {
        self.search(&QueryParser::parse(query), options)
    }

    pub(crate) fn page_size(&self, options: &SearchOptions) -> usize {
        options.size.unwrap_or(self.settings.default_page_size)
    }

    /// All shards' top `window` hits, merged but not paginated
    pub(crate) fn search_partial(
        &self,
        query: &Query,
        options: &SearchOptions,
        window: usize,
    ) -> PartialResult {
        let guards: Vec<_> = self.shards.iter().map(|shard| shard.read()).collect();
        let stats = MergedStats::new(
            guards
                .iter()
                .map(|guard| guard.local_stats())
                .collect::<Vec<LocalStats<'_>>>(),
        );

        let partials: Vec<PartialResult> = guards
            .par_iter()
            .map(|guard| guard.search_partial(query, options, &stats, window))
            .collect();

        let merged = merge(partials, 0, window);
        PartialResult {
            hits: merged.hits,
            total: merged.total,
            facets: merged.facets,
        }
    }

    /// One snapshot per shard, in shard order
    pub fn snapshots(&self) -> Vec<EngineSnapshot> {
        self.shards.iter().map(|shard| shard.read().snapshot()).collect()
    }

    /// Rebuild from [`ShardedSearchEngine::snapshots`] output
    ///
    /// Documents are re-routed, so the snapshots may come from a different
    /// shard count.
    pub fn from_snapshots(shard_count: usize, snapshots: Vec<EngineSnapshot>) -> Result<Self> {
        let settings = snapshots
            .first()
            .map(|snapshot| snapshot.settings.clone())
            .unwrap_or_default();
        let engine = Self::new(shard_count, settings)?;

        let mut by_shard: Vec<Vec<_>> = vec![Vec::new(); shard_count];
        let mut mappings = FieldMappings::new();
        for snapshot in snapshots {
            if !snapshot.is_compatible() {
                return Err(QuarryError::IncompatibleSnapshot {
                    expected: SNAPSHOT_VERSION,
                    actual: snapshot.version,
                });
            }
            for (field, field_type) in snapshot.mappings.iter() {
                mappings.put(field, field_type.clone())?;
            }
            for doc in snapshot.documents {
                by_shard[shard_for(&doc.document.id, shard_count)].push(doc);
            }
        }

        for (shard, mut documents) in engine.shards.iter().zip(by_shard) {
            documents.sort_by_key(|doc| doc.seq);
            let snapshot = EngineSnapshot::new(engine.settings.clone(), mappings.clone(), documents);
            shard.write().restore(snapshot)?;
        }
        *engine.mappings.write() = mappings;
        Ok(engine)
    }
}

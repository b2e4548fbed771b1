use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

use super::facets::FacetIndex;
use super::ranking::{self, scored_order, top_window, PartialResult, Ranker, ScoredDoc};
use super::scoring::{Bm25Scorer, Scorer};
use super::snapshot::{EngineSnapshot, SnapshotDocument, SNAPSHOT_VERSION};
use super::statistics::{CorpusStats, DocLengths, LocalStats};
use crate::config::EngineSettings;
use crate::error::{QuarryError, Result};
use crate::index::{new_token_index, token_key, DocNo, DocStore, TokenIndex};
use crate::models::{Command, Document, SearchHit, SearchOptions, SearchResponse};
use crate::persistence::{MappingStore, SnapshotStore, WriteAheadLog};
use crate::query::context::{analyze_for_field, value_terms};
use crate::query::{Query, QueryContext, QueryExecutor, QueryParser};
use crate::schema::{FieldMappings, FieldType};
use crate::tokenizer::{Analyzer, Stemmer, StopwordSource, SynonymSource};

/// Single-shard search engine.
///
/// Owns the documents, the positional index, the length table and the facet
/// index of one shard. Writes take `&mut self`, so a replacement (remove then
/// re-insert) is never observed half done by a reader holding `&self`.
pub struct SearchEngine {
    settings: EngineSettings,
    analyzer: Analyzer,
    mappings: FieldMappings,
    index: Box<dyn TokenIndex>,
    docs: DocStore,
    lengths: DocLengths,
    facets: FacetIndex,
    scorer: Arc<dyn Scorer>,
    synonyms: Option<Arc<dyn SynonymSource>>,
    wal: Option<Arc<dyn WriteAheadLog>>,
    // Shared across the shards of one index
    sequence: Arc<AtomicU64>,
}

impl SearchEngine {
    pub fn new(settings: EngineSettings) -> Result<Self> {
        settings.validate()?;
        let analyzer = Analyzer::new(&settings.analysis)?;
        Ok(Self {
            analyzer,
            mappings: FieldMappings::new(),
            index: new_token_index(settings.token_shards),
            docs: DocStore::new(),
            lengths: DocLengths::new(),
            facets: FacetIndex::new(),
            scorer: Arc::new(Bm25Scorer::new(settings.bm25)),
            synonyms: None,
            wal: None,
            sequence: Arc::new(AtomicU64::new(0)),
            settings,
        })
    }

    /// Replace the BM25 scorer
    pub fn with_scorer(mut self, scorer: Arc<dyn Scorer>) -> Self {
        self.scorer = scorer;
        self
    }

    /// Expand match query terms through `synonyms`
    pub fn with_synonyms(mut self, synonyms: Arc<dyn SynonymSource>) -> Self {
        self.synonyms = Some(synonyms);
        self
    }

    /// Replace the stopword set; install before indexing
    pub fn with_stopwords(mut self, source: &dyn StopwordSource) -> Self {
        self.analyzer = self.analyzer.with_stopwords(source);
        self
    }

    /// Replace the stemmer of the `stemming` analyzer; install before indexing
    pub fn with_stemmer(mut self, stemmer: Arc<dyn Stemmer>) -> Self {
        self.analyzer = self.analyzer.with_stemmer(stemmer);
        self
    }

    /// Log every mutation to `wal` before applying it
    pub fn with_wal(mut self, wal: Arc<dyn WriteAheadLog>) -> Self {
        self.wal = Some(wal);
        self
    }

    pub(crate) fn with_sequence(mut self, sequence: Arc<AtomicU64>) -> Self {
        self.sequence = sequence;
        self
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Declare a field type before documents introduce it
    pub fn put_mapping(&mut self, field: impl Into<String>, field_type: FieldType) -> Result<bool> {
        self.mappings.put(field, field_type)
    }

    pub fn mapping(&self, field: &str) -> Option<&FieldType> {
        self.mappings.get(field)
    }

    pub fn mappings(&self) -> &FieldMappings {
        &self.mappings
    }

    /// Index a document, replacing any stored document with the same id
    ///
    /// Validation happens before anything is logged or mutated; a rejected
    /// document leaves the engine untouched.
    pub fn add(&mut self, doc: Document) -> Result<()> {
        doc.validate()?;
        let inferred = self.mappings.resolve(
            &doc,
            self.settings.analysis.default_mode,
            self.settings.date_detection,
        )?;
        if let Some(wal) = &self.wal {
            wal.append(&Command::IndexDocument(doc.clone()))?;
        }

        self.mappings.apply(inferred);
        let replaced = self.remove_document(&doc.id);
        let seq = self.sequence.fetch_add(1, Ordering::SeqCst);
        debug!(id = %doc.id, seq, replaced, "indexing document");
        self.index_document(doc, seq)?;
        Ok(())
    }

    /// Index a `{id, <field>: value, ...}` JSON document
    pub fn add_json(&mut self, value: &Value) -> Result<()> {
        self.add(Document::from_json(value)?)
    }

    /// Index documents in order, stopping at the first failure
    ///
    /// Documents before the failing one stay indexed. Returns the number
    /// indexed.
    pub fn add_batch<I>(&mut self, docs: I) -> Result<usize>
    where
        I: IntoIterator<Item = Document>,
    {
        let mut added = 0;
        for doc in docs {
            self.add(doc)?;
            added += 1;
        }
        Ok(added)
    }

    /// Remove a document; `false` when the id is unknown
    pub fn delete(&mut self, id: &str) -> Result<bool> {
        if !self.docs.contains(id) {
            return Ok(false);
        }
        if let Some(wal) = &self.wal {
            wal.append(&Command::DeleteDocument(id.to_string()))?;
        }
        self.remove_document(id);
        debug!(id, "document deleted");
        Ok(true)
    }

    /// Apply a logged mutation
    pub fn apply_command(&mut self, command: Command) -> Result<()> {
        match command {
            Command::IndexDocument(doc) => self.add(doc),
            Command::DeleteDocument(id) => self.delete(&id).map(|_| ()),
        }
    }

    fn index_document(&mut self, doc: Document, seq: u64) -> Result<DocNo> {
        let mut occurrences: Vec<(String, u32)> = Vec::new();
        for (field, value) in &doc.fields {
            let Some(field_type) = self.mappings.get(field) else {
                continue;
            };
            let terms = value_terms(&self.analyzer, field_type, value);
            occurrences.extend(
                terms
                    .into_iter()
                    .enumerate()
                    .map(|(pos, term)| (token_key(field, &term), pos as u32)),
            );
        }
        let facet_values = self.facet_values(&doc);

        let mut tokens: Vec<String> = occurrences.iter().map(|(token, _)| token.clone()).collect();
        tokens.sort_unstable();
        tokens.dedup();
        let length = u32::try_from(occurrences.len()).unwrap_or(u32::MAX);

        let docno = self.docs.insert(doc, seq, tokens)?;
        for (token, position) in &occurrences {
            self.index.add_token(token, docno, *position);
        }
        self.lengths.insert(docno, length);
        for (field, value) in &facet_values {
            self.facets.add(field, value, docno);
        }
        Ok(docno)
    }

    fn remove_document(&mut self, id: &str) -> bool {
        let Some((docno, stored)) = self.docs.remove(id) else {
            return false;
        };
        for token in &stored.tokens {
            self.index.remove_token(token, docno);
        }
        self.lengths.remove(docno);
        for (field, value) in self.facet_values(&stored.doc) {
            self.facets.remove(&field, &value, docno);
        }
        true
    }

    /// (field, value) pairs the facet engine tracks for `doc`
    fn facet_values(&self, doc: &Document) -> Vec<(String, String)> {
        doc.fields
            .iter()
            .filter(|(field, _)| match self.mappings.get(field) {
                Some(FieldType::GeoPoint) | None => false,
                Some(field_type) => {
                    field_type.supports_facets() || self.settings.facet_fields.contains(field)
                }
            })
            .map(|(field, value)| (field.clone(), value.display_string()))
            .collect()
    }

    pub fn get(&self, id: &str) -> Option<&Document> {
        self.docs.get(id).map(|stored| &stored.doc)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.docs.contains(id)
    }

    pub fn total_docs(&self) -> u64 {
        self.docs.len() as u64
    }

    pub fn avg_doc_length(&self) -> f32 {
        self.lengths.average()
    }

    /// Tokens `text` produces for `field`
    ///
    /// Unmapped fields use the default text analyzer.
    pub fn analyze(&self, field: &str, text: &str) -> Vec<String> {
        match self.mappings.get(field) {
            Some(field_type) => analyze_for_field(&self.analyzer, field_type, text, None),
            None => self
                .analyzer
                .tokenize(text, self.settings.analysis.default_mode),
        }
    }

    /// Documents holding the indexed `term` in `field`
    pub fn document_frequency(&self, field: &str, term: &str) -> u64 {
        self.index.document_frequency(&token_key(field, term))
    }

    /// Occurrences of the indexed `term` in `field` of document `id`
    pub fn term_frequency(&self, field: &str, term: &str, id: &str) -> u32 {
        self.docs
            .docno(id)
            .map_or(0, |docno| self.index.term_frequency(&token_key(field, term), docno))
    }

    pub(crate) fn local_stats(&self) -> LocalStats<'_> {
        LocalStats::new(self.index.as_ref(), &self.lengths)
    }

    pub(crate) fn page_size(&self, options: &SearchOptions) -> usize {
        options.size.unwrap_or(self.settings.default_page_size)
    }

    /// Run a query and return one ranked page
    pub fn search(&self, query: &Query, options: &SearchOptions) -> SearchResponse {
        let size = self.page_size(options);
        let stats = self.local_stats();
        let partial = self.search_partial(query, options, &stats, options.from.saturating_add(size));
        ranking::merge(vec![partial], options.from, size)
    }

    /// Run a JSON query DSL tree
    pub fn search_json(&self, query: &Value, options: &SearchOptions) -> SearchResponse {
        self.search(&QueryParser::parse(query), options)
    }

    /// Run a query given as JSON text; blank text matches everything
    pub fn search_str(&self, query: &str, options: &SearchOptions) -> Result<SearchResponse> {
        Ok(self.search(&QueryParser::parse_str(query)?, options))
    }

    /// Evaluate, score and keep the top `window` hits of this shard
    pub(crate) fn search_partial(
        &self,
        query: &Query,
        options: &SearchOptions,
        stats: &dyn CorpusStats,
        window: usize,
    ) -> PartialResult {
        let ctx = QueryContext::new(self.index.as_ref(), &self.docs, &self.mappings, &self.analyzer)
            .with_synonyms(self.synonyms.as_deref())
            .with_operator(options.operator);
        let clause = QueryExecutor::execute(query, &ctx);

        let ranker = Ranker {
            index: self.index.as_ref(),
            lengths: &self.lengths,
            stats,
            scorer: self.scorer.as_ref(),
            settings: &self.settings,
        };
        let scores = ranker.score(&clause);
        debug!(query = query.query_type(), matched = clause.len(), "query evaluated");

        let mut scored: Vec<ScoredDoc> = clause
            .matches
            .iter()
            .filter_map(|doc| {
                let docno = DocNo::new(doc);
                let stored = self.docs.by_docno(docno)?;
                Some(ScoredDoc {
                    docno,
                    score: scores.get(&doc).copied().unwrap_or(0.0),
                    seq: stored.seq,
                })
            })
            .collect();
        top_window(&mut scored, window, scored_order);

        PartialResult {
            hits: scored.iter().filter_map(|s| self.hit(s)).collect(),
            total: clause.len(),
            facets: self.facets.counts(&clause.matches, &options.facets),
        }
    }

    fn hit(&self, scored: &ScoredDoc) -> Option<SearchHit> {
        let stored = self.docs.by_docno(scored.docno)?;
        let fields: BTreeMap<String, Value> = stored
            .doc
            .fields
            .iter()
            .map(|(name, value)| (name.clone(), value.to_json()))
            .collect();
        Some(
            SearchHit::new(stored.doc.id.clone(), scored.score)
                .with_fields(fields)
                .with_seq(scored.seq),
        )
    }

    /// Capture settings, mappings and live documents
    pub fn snapshot(&self) -> EngineSnapshot {
        let mut documents: Vec<SnapshotDocument> = self
            .docs
            .iter()
            .map(|(_, stored)| SnapshotDocument {
                document: stored.doc.clone(),
                seq: stored.seq,
            })
            .collect();
        documents.sort_by_key(|d| d.seq);
        EngineSnapshot::new(self.settings.clone(), self.mappings.clone(), documents)
    }

    /// Build an engine from a snapshot, using the snapshot's settings
    pub fn from_snapshot(snapshot: EngineSnapshot) -> Result<Self> {
        let mut engine = Self::new(snapshot.settings.clone())?;
        engine.restore(snapshot)?;
        Ok(engine)
    }

    /// Replace this engine's contents with a snapshot's
    ///
    /// Documents keep their insertion sequence; the index is rebuilt.
    pub fn restore(&mut self, snapshot: EngineSnapshot) -> Result<()> {
        if !snapshot.is_compatible() {
            return Err(QuarryError::IncompatibleSnapshot {
                expected: SNAPSHOT_VERSION,
                actual: snapshot.version,
            });
        }
        self.clear();
        self.mappings = snapshot.mappings;

        let count = snapshot.documents.len();
        for SnapshotDocument { document, seq } in snapshot.documents {
            let inferred = self.mappings.resolve(
                &document,
                self.settings.analysis.default_mode,
                self.settings.date_detection,
            )?;
            self.mappings.apply(inferred);
            self.index_document(document, seq)?;
            self.sequence.fetch_max(seq + 1, Ordering::SeqCst);
        }
        info!(documents = count, "snapshot restored");
        Ok(())
    }

    /// Open an engine from persisted state and log further mutations to `wal`
    pub fn open(
        settings: EngineSettings,
        snapshots: &dyn SnapshotStore,
        mapping_store: &dyn MappingStore,
        wal: Arc<dyn WriteAheadLog>,
    ) -> Result<Self> {
        let mut engine = Self::new(settings)?;
        engine.recover(snapshots, mapping_store, wal)?;
        Ok(engine)
    }

    /// Restore the latest snapshot (or the stored mappings when there is
    /// none), replay `wal` on top, then attach it
    ///
    /// Returns the number of replayed entries.
    pub fn recover(
        &mut self,
        snapshots: &dyn SnapshotStore,
        mapping_store: &dyn MappingStore,
        wal: Arc<dyn WriteAheadLog>,
    ) -> Result<usize> {
        match snapshots.load()? {
            Some(snapshot) => self.restore(snapshot)?,
            None => {
                if let Some(mappings) = mapping_store.load()? {
                    self.clear();
                    self.mappings = mappings;
                }
            }
        }

        self.wal = None;
        let entries = wal.replay()?;
        let replayed = entries.len();
        for entry in entries {
            self.apply_command(entry)?;
        }
        self.wal = Some(wal);

        info!(replayed, documents = self.total_docs(), "write-ahead log replayed");
        Ok(replayed)
    }

    /// Save a snapshot and the mapping table, then truncate the log
    pub fn checkpoint(
        &self,
        snapshots: &dyn SnapshotStore,
        mapping_store: &dyn MappingStore,
    ) -> Result<()> {
        let snapshot = self.snapshot();
        snapshots.save(&snapshot)?;
        mapping_store.save(&self.mappings)?;
        if let Some(wal) = &self.wal {
            wal.reset()?;
        }
        info!(documents = snapshot.len(), "checkpoint complete");
        Ok(())
    }

    fn clear(&mut self) {
        self.mappings = FieldMappings::new();
        self.index.clear();
        self.docs.clear();
        self.lengths.clear();
        self.facets.clear();
    }
}

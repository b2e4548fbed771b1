use std::sync::Arc;

use tempfile::TempDir;

use quarry::query::MatchQuery;
use quarry::{
    Command, Document, EngineSettings, FieldType, FileSnapshotStore, FileWal, JsonMappingStore,
    MappingStore, SearchEngine, SearchOptions, SnapshotStore, WriteAheadLog,
};

struct Stores {
    _tmp: TempDir,
    snapshots: FileSnapshotStore,
    mappings: JsonMappingStore,
    wal_path: std::path::PathBuf,
}

fn setup_stores() -> Stores {
    let tmp = TempDir::new().unwrap();
    Stores {
        snapshots: FileSnapshotStore::new(tmp.path().join("engine.snap")),
        mappings: JsonMappingStore::new(tmp.path().join("mappings.json")),
        wal_path: tmp.path().join("engine.wal"),
        _tmp: tmp,
    }
}

fn open_engine(stores: &Stores) -> SearchEngine {
    let wal = Arc::new(FileWal::open(&stores.wal_path).unwrap());
    SearchEngine::open(
        EngineSettings::default(),
        &stores.snapshots,
        &stores.mappings,
        wal,
    )
    .unwrap()
}

fn create_doc(id: &str, title: &str) -> Document {
    Document::new(id).with_field("title", title)
}

fn search_ids(engine: &SearchEngine, text: &str) -> Vec<String> {
    engine
        .search(&MatchQuery::new("title", text).into(), &SearchOptions::new())
        .ids()
        .into_iter()
        .map(str::to_string)
        .collect()
}

#[test]
fn test_wal_replays_unsnapshotted_writes() {
    let stores = setup_stores();
    {
        let mut engine = open_engine(&stores);
        engine.add(create_doc("1", "durable storage")).unwrap();
        engine.add(create_doc("2", "volatile memory")).unwrap();
        engine.delete("2").unwrap();
    }

    let engine = open_engine(&stores);
    assert_eq!(engine.total_docs(), 1);
    assert_eq!(search_ids(&engine, "durable"), vec!["1"]);
    assert!(search_ids(&engine, "volatile").is_empty());
}

#[test]
fn test_checkpoint_then_recover() {
    let stores = setup_stores();
    {
        let mut engine = open_engine(&stores);
        engine.put_mapping("sku", FieldType::Keyword).unwrap();
        engine.add(create_doc("a", "first checkpointed").with_field("sku", "A-1")).unwrap();
        engine.add(create_doc("b", "second checkpointed")).unwrap();
        engine.checkpoint(&stores.snapshots, &stores.mappings).unwrap();

        engine.add(create_doc("c", "after checkpoint")).unwrap();
    }

    let wal = FileWal::open(&stores.wal_path).unwrap();
    assert_eq!(
        wal.replay().unwrap(),
        vec![Command::IndexDocument(create_doc("c", "after checkpoint"))]
    );
    assert_eq!(
        stores.mappings.load().unwrap().unwrap().get("sku"),
        Some(&FieldType::Keyword)
    );

    let engine = open_engine(&stores);
    assert_eq!(engine.total_docs(), 3);
    let mut ids = search_ids(&engine, "checkpointed");
    ids.sort();
    assert_eq!(ids, vec!["a", "b"]);
    assert_eq!(engine.mapping("sku"), Some(&FieldType::Keyword));
}

#[test]
fn test_recovered_engine_keeps_insertion_order() {
    let stores = setup_stores();
    {
        let mut engine = open_engine(&stores);
        for id in ["z", "y", "x"] {
            engine.add(create_doc(id, "same words")).unwrap();
        }
        engine.checkpoint(&stores.snapshots, &stores.mappings).unwrap();
        engine.add(create_doc("w", "same words")).unwrap();
    }

    let mut engine = open_engine(&stores);
    assert_eq!(search_ids(&engine, "same"), vec!["z", "y", "x", "w"]);

    // New writes sort after everything restored
    engine.add(create_doc("v", "same words")).unwrap();
    assert_eq!(search_ids(&engine, "same").last().map(String::as_str), Some("v"));
}

#[test]
fn test_snapshot_round_trip_without_wal() {
    let stores = setup_stores();
    let mut engine = SearchEngine::new(EngineSettings::default().with_default_page_size(3)).unwrap();
    engine.add(create_doc("1", "snapshot only")).unwrap();
    stores.snapshots.save(&engine.snapshot()).unwrap();

    let loaded = stores.snapshots.load().unwrap().unwrap();
    let restored = SearchEngine::from_snapshot(loaded).unwrap();
    assert_eq!(restored.settings().default_page_size, 3);
    assert_eq!(restored.get("1"), engine.get("1"));
}

#[test]
fn test_mappings_load_without_snapshot() {
    let stores = setup_stores();
    let mut mappings = quarry::FieldMappings::new();
    mappings.put("code", FieldType::Keyword).unwrap();
    stores.mappings.save(&mappings).unwrap();

    let mut engine = open_engine(&stores);
    assert_eq!(engine.mapping("code"), Some(&FieldType::Keyword));
    engine.add(Document::new("1").with_field("code", "AB-12 X")).unwrap();
    let response = engine.search(
        &quarry::query::TermQuery::new("code", "ab-12 x").into(),
        &SearchOptions::new(),
    );
    assert_eq!(response.ids(), vec!["1"]);
}

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use quarry::query::{BoolQuery, FuzzyQuery, MatchQuery, RangeQuery};
use quarry::{Document, EngineSettings, Query, SearchEngine, SearchOptions, ShardedSearchEngine};

const WORDS: &[&str] = &[
    "rust", "programming", "language", "systems", "memory", "safety", "search", "engine",
    "index", "query", "thread", "async", "compiler", "cargo", "crate", "trait",
];

fn make_doc(id: usize) -> Document {
    let title: Vec<&str> = (0..8).map(|j| WORDS[(id * 5 + j * 7) % WORDS.len()]).collect();
    Document::new(id.to_string())
        .with_field("title", title.join(" "))
        .with_field("price", (id % 500) as f64)
}

fn build_engine(doc_count: usize) -> SearchEngine {
    let mut engine = SearchEngine::new(EngineSettings::default()).unwrap();
    for i in 0..doc_count {
        engine.add(make_doc(i)).unwrap();
    }
    engine
}

fn build_sharded(doc_count: usize, shards: usize) -> ShardedSearchEngine {
    let engine = ShardedSearchEngine::new(shards, EngineSettings::default()).unwrap();
    engine.add_batch((0..doc_count).map(make_doc)).unwrap();
    engine
}

fn queries() -> Vec<(&'static str, Query)> {
    vec![
        ("match", MatchQuery::new("title", "rust programming").into()),
        ("fuzzy", FuzzyQuery::new("title", "compilr").with_fuzziness(1).into()),
        (
            "bool",
            BoolQuery::new()
                .must(MatchQuery::new("title", "memory"))
                .should(MatchQuery::new("title", "safety"))
                .must_not(RangeQuery::new("price").gt(400.0))
                .into(),
        ),
    ]
}

fn bench_indexing(c: &mut Criterion) {
    let mut group = c.benchmark_group("indexing");
    for count in [1_000usize, 5_000] {
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            b.iter(|| black_box(build_engine(count)));
        });
    }
    group.finish();
}

fn bench_search(c: &mut Criterion) {
    let counts = [1_000usize, 5_000, 10_000];
    let engines: Vec<(usize, SearchEngine)> =
        counts.iter().map(|&count| (count, build_engine(count))).collect();
    let options = SearchOptions::new().with_size(10);

    for (name, query) in queries() {
        let mut group = c.benchmark_group(format!("search_{name}"));
        for (count, engine) in &engines {
            group.bench_with_input(BenchmarkId::from_parameter(count), engine, |b, engine| {
                b.iter(|| black_box(engine.search(&query, &options)));
            });
        }
        group.finish();
    }
}

fn bench_sharded_search(c: &mut Criterion) {
    let query: Query = MatchQuery::new("title", "rust programming").into();
    let options = SearchOptions::new().with_size(10);

    let mut group = c.benchmark_group("sharded_search");
    for shards in [1usize, 4, 8] {
        let engine = build_sharded(10_000, shards);
        group.bench_with_input(BenchmarkId::from_parameter(shards), &engine, |b, engine| {
            b.iter(|| black_box(engine.search(&query, &options)));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_indexing, bench_search, bench_sharded_search);
criterion_main!(benches);

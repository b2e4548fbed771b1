//! Query DSL and execution engine
//!
//! This module provides a structured query language supporting:
//! - Boolean queries (must, should, must_not)
//! - Full-text match, multi-field match and phrase queries
//! - Exact term, terms, prefix, wildcard and fuzzy queries
//! - Range queries (numeric, date, lexicographic)
//! - Geo distance queries
//!
//! # Example
//!
//! ```json
//! {
//!   "bool": {
//!     "must": [
//!       { "match": { "content": "rust programming" } }
//!     ],
//!     "must_not": [
//!       { "range": { "created_at": { "lt": "2024-01-01" } } }
//!     ]
//!   }
//! }
//! ```

pub mod ast;
pub mod context;
pub mod executor;
pub mod nodes;
pub mod parser;
pub mod types;

pub use ast::Query;
pub use context::QueryContext;
pub use executor::QueryExecutor;
pub use nodes::{
    AllDocsQuery, BoolQuery, FuzzyQuery, GeoDistanceQuery, MatchQuery, MultiMatchQuery,
    PhraseQuery, PrefixQuery, RangeQuery, TermQuery, TermsQuery, WildcardQuery,
};
pub use parser::QueryParser;
pub use types::*;

pub mod command;
pub mod document;
pub mod search;

pub use command::Command;
pub use document::{Document, DocumentId, FieldValue, GeoPoint};
pub use search::{FacetCounts, SearchHit, SearchOptions, SearchResponse};

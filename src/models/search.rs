use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use super::document::DocumentId;
use crate::query::MatchOperator;

/// Facet field → value → document count
pub type FacetCounts = BTreeMap<String, BTreeMap<String, u64>>;

/// Search options: pagination, default match operator and requested facets
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchOptions {
    pub from: usize,
    /// Page size; the engine default applies when absent
    pub size: Option<usize>,
    /// Operator for match leaves that do not carry their own
    pub operator: MatchOperator,
    pub facets: Vec<String>,
}

impl SearchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_from(mut self, from: usize) -> Self {
        self.from = from;
        self
    }

    pub fn with_size(mut self, size: usize) -> Self {
        self.size = Some(size);
        self
    }

    pub fn with_operator(mut self, operator: MatchOperator) -> Self {
        self.operator = operator;
        self
    }

    pub fn with_facet(mut self, field: impl Into<String>) -> Self {
        self.facets.push(field.into());
        self
    }
}

/// One ranked hit: the document's fields plus its score
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub id: DocumentId,
    #[serde(flatten)]
    pub fields: BTreeMap<String, Value>,
    #[serde(rename = "_score")]
    pub score: f32,
    /// Source index for hits merged across a cluster
    #[serde(rename = "_index", default, skip_serializing_if = "Option::is_none")]
    pub index: Option<String>,
    /// Global insertion sequence, the tie-break for equal scores
    #[serde(skip)]
    pub(crate) seq: u64,
    /// Creation ordinal of the source index, compared before `seq`
    #[serde(skip)]
    pub(crate) origin: usize,
}

impl SearchHit {
    pub fn new(id: impl Into<DocumentId>, score: f32) -> Self {
        Self {
            id: id.into(),
            fields: BTreeMap::new(),
            score,
            index: None,
            seq: 0,
            origin: 0,
        }
    }

    pub fn with_fields(mut self, fields: BTreeMap<String, Value>) -> Self {
        self.fields = fields;
        self
    }

    pub(crate) fn with_seq(mut self, seq: u64) -> Self {
        self.seq = seq;
        self
    }
}

/// Search response
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub hits: Vec<SearchHit>,
    /// Number of matching documents before pagination
    pub total: u64,
    pub from: usize,
    pub size: usize,
    pub facets: FacetCounts,
}

impl SearchResponse {
    /// Ids of the returned hits, in rank order
    pub fn ids(&self) -> Vec<&str> {
        self.hits.iter().map(|hit| hit.id.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }
}

use roaring::RoaringBitmap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::DocNo;

/// Positional posting for one token: document → ascending, unique positions
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Posting {
    docs: BTreeMap<DocNo, Vec<u32>>,
}

impl Posting {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `position` for `doc`; inserting an existing position is a no-op
    pub fn add(&mut self, doc: DocNo, position: u32) {
        let positions = self.docs.entry(doc).or_default();
        if let Err(idx) = positions.binary_search(&position) {
            positions.insert(idx, position);
        }
    }

    /// Drop every position of `doc`
    pub fn remove(&mut self, doc: DocNo) -> bool {
        self.docs.remove(&doc).is_some()
    }

    pub fn positions(&self, doc: DocNo) -> Option<&[u32]> {
        self.docs.get(&doc).map(Vec::as_slice)
    }

    pub fn contains(&self, doc: DocNo) -> bool {
        self.docs.contains_key(&doc)
    }

    /// Number of documents containing the token
    pub fn document_frequency(&self) -> usize {
        self.docs.len()
    }

    /// Occurrences of the token in `doc`
    pub fn term_frequency(&self, doc: DocNo) -> u32 {
        self.docs.get(&doc).map_or(0, |p| p.len() as u32)
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    pub fn docs(&self) -> impl Iterator<Item = DocNo> + '_ {
        self.docs.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (DocNo, &[u32])> + '_ {
        self.docs.iter().map(|(doc, positions)| (*doc, positions.as_slice()))
    }

    /// Document set as a bitmap
    pub fn to_bitmap(&self) -> RoaringBitmap {
        self.docs.keys().map(|doc| doc.as_u32()).collect()
    }
}

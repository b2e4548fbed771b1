use roaring::RoaringBitmap;
use std::collections::HashMap;

use super::DocNo;
use crate::error::{QuarryError, Result};
use crate::models::{Document, FieldValue};

/// A stored document with its bookkeeping
#[derive(Clone, Debug, PartialEq)]
pub struct StoredDocument {
    pub doc: Document,
    /// Insertion sequence, the tie-break for equal scores
    pub seq: u64,
    /// Distinct index keys written for this document
    pub(crate) tokens: Vec<String>,
}

/// In-memory document store: the canonical copy of every live document
///
/// Document numbers are dense and never reused; a replaced document gets a
/// fresh number.
#[derive(Clone, Debug, Default)]
pub struct DocStore {
    ids: HashMap<String, DocNo>,
    docs: HashMap<DocNo, StoredDocument>,
    live: RoaringBitmap,
    next_docno: u32,
}

impl DocStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a document under a new document number
    ///
    /// The caller removes any previous version first.
    pub fn insert(&mut self, doc: Document, seq: u64, tokens: Vec<String>) -> Result<DocNo> {
        if self.ids.contains_key(&doc.id) {
            return Err(QuarryError::Internal(format!(
                "document `{}` is already stored",
                doc.id
            )));
        }
        let docno = DocNo::new(self.next_docno);
        self.next_docno = self
            .next_docno
            .checked_add(1)
            .ok_or_else(|| QuarryError::Internal("document numbers exhausted".to_string()))?;

        self.ids.insert(doc.id.clone(), docno);
        self.live.insert(docno.as_u32());
        self.docs.insert(docno, StoredDocument { doc, seq, tokens });
        Ok(docno)
    }

    pub fn remove(&mut self, id: &str) -> Option<(DocNo, StoredDocument)> {
        let docno = self.ids.remove(id)?;
        self.live.remove(docno.as_u32());
        self.docs.remove(&docno).map(|stored| (docno, stored))
    }

    pub fn get(&self, id: &str) -> Option<&StoredDocument> {
        self.ids.get(id).and_then(|docno| self.docs.get(docno))
    }

    pub fn docno(&self, id: &str) -> Option<DocNo> {
        self.ids.get(id).copied()
    }

    pub fn by_docno(&self, docno: DocNo) -> Option<&StoredDocument> {
        self.docs.get(&docno)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains_key(id)
    }

    /// Live document numbers
    pub fn live(&self) -> &RoaringBitmap {
        &self.live
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    /// Live documents in document-number order
    pub fn iter(&self) -> impl Iterator<Item = (DocNo, &StoredDocument)> + '_ {
        self.live.iter().filter_map(move |n| {
            let docno = DocNo::new(n);
            self.docs.get(&docno).map(|stored| (docno, stored))
        })
    }

    /// Live documents holding `field`, with its value
    pub fn with_field<'s, 'f>(
        &'s self,
        field: &'f str,
    ) -> impl Iterator<Item = (DocNo, &'s FieldValue)> + 'f
    where
        's: 'f,
    {
        self.iter()
            .filter_map(move |(docno, stored)| stored.doc.get(field).map(|value| (docno, value)))
    }

    pub fn clear(&mut self) {
        self.ids.clear();
        self.docs.clear();
        self.live.clear();
    }
}

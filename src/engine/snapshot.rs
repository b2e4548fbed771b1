use serde::{Deserialize, Serialize};

use crate::config::EngineSettings;
use crate::models::Document;
use crate::schema::FieldMappings;

/// Snapshot version for compatibility checking
pub const SNAPSHOT_VERSION: u32 = 1;

/// A stored document and its insertion sequence
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SnapshotDocument {
    pub document: Document,
    pub seq: u64,
}

/// Complete state of one engine
///
/// Index structures are derived data and are rebuilt on restore.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EngineSnapshot {
    pub version: u32,
    pub settings: EngineSettings,
    pub mappings: FieldMappings,
    /// Live documents in insertion order
    pub documents: Vec<SnapshotDocument>,
}

impl EngineSnapshot {
    /// Create a new snapshot with the current version
    pub fn new(
        settings: EngineSettings,
        mappings: FieldMappings,
        documents: Vec<SnapshotDocument>,
    ) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            settings,
            mappings,
            documents,
        }
    }

    /// Serialize snapshot to bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>, bincode::Error> {
        bincode::serialize(self)
    }

    /// Deserialize snapshot from bytes
    pub fn from_bytes(data: &[u8]) -> Result<Self, bincode::Error> {
        bincode::deserialize(data)
    }

    /// Check if this snapshot version is compatible
    pub fn is_compatible(&self) -> bool {
        self.version <= SNAPSHOT_VERSION
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

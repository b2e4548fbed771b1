//! Persistence collaborators: snapshot store, write-ahead log and mapping store.
//!
//! The engine only depends on the traits; the file-backed implementations
//! own their on-disk formats.

mod mapping_store;
mod snapshot_store;
mod wal;

pub use mapping_store::JsonMappingStore;
pub use snapshot_store::FileSnapshotStore;
pub use wal::FileWal;

use crate::engine::EngineSnapshot;
use crate::error::Result;
use crate::models::Command;
use crate::schema::FieldMappings;

/// A mutation recorded between snapshots
pub type WalEntry = Command;

/// Saves and loads whole-engine snapshots
pub trait SnapshotStore: Send + Sync {
    fn save(&self, snapshot: &EngineSnapshot) -> Result<()>;

    /// `None` when nothing was saved yet
    fn load(&self) -> Result<Option<EngineSnapshot>>;
}

/// Append-only log of mutations applied since the last snapshot
pub trait WriteAheadLog: Send + Sync {
    fn append(&self, entry: &WalEntry) -> Result<()>;

    /// Every entry appended since the last reset, in order
    fn replay(&self) -> Result<Vec<WalEntry>>;

    /// Discard all entries, after a snapshot made them redundant
    fn reset(&self) -> Result<()>;
}

/// Loads and saves the field → type table
pub trait MappingStore: Send + Sync {
    fn load(&self) -> Result<Option<FieldMappings>>;

    fn save(&self, mappings: &FieldMappings) -> Result<()>;
}

/// Little-endian u32 at `offset`, if the buffer is long enough
pub(crate) fn read_u32(buf: &[u8], offset: usize) -> Option<u32> {
    let bytes = buf.get(offset..offset.checked_add(4)?)?;
    Some(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crc32fast::Hasher;
use tracing::info;

use super::{read_u32, SnapshotStore};
use crate::engine::{EngineSnapshot, SNAPSHOT_VERSION};
use crate::error::{QuarryError, Result};

/// Snapshot file: u32 crc32 (little endian) followed by the bincode payload
///
/// Saves write a sibling temp file and rename it over the target, so a
/// failed save leaves the previous snapshot intact.
pub struct FileSnapshotStore {
    path: PathBuf,
}

impl FileSnapshotStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl SnapshotStore for FileSnapshotStore {
    fn save(&self, snapshot: &EngineSnapshot) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let payload = snapshot.to_bytes()?;
        let mut hasher = Hasher::new();
        hasher.update(&payload);

        let temp = self.temp_path();
        {
            let mut file = fs::File::create(&temp)?;
            file.write_all(&hasher.finalize().to_le_bytes())?;
            file.write_all(&payload)?;
            file.sync_all()?;
        }
        fs::rename(&temp, &self.path)?;

        info!(
            path = %self.path.display(),
            documents = snapshot.len(),
            bytes = payload.len(),
            "snapshot saved"
        );
        Ok(())
    }

    fn load(&self) -> Result<Option<EngineSnapshot>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let bytes = fs::read(&self.path)?;
        let expected = read_u32(&bytes, 0)
            .ok_or_else(|| QuarryError::Persistence("snapshot file is truncated".to_string()))?;
        let payload = &bytes[4..];

        let mut hasher = Hasher::new();
        hasher.update(payload);
        let actual = hasher.finalize();
        if actual != expected {
            return Err(QuarryError::ChecksumMismatch { expected, actual });
        }

        let snapshot = EngineSnapshot::from_bytes(payload)?;
        if !snapshot.is_compatible() {
            return Err(QuarryError::IncompatibleSnapshot {
                expected: SNAPSHOT_VERSION,
                actual: snapshot.version,
            });
        }
        info!(path = %self.path.display(), documents = snapshot.len(), "snapshot loaded");
        Ok(Some(snapshot))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineSettings;
    use crate::engine::SnapshotDocument;
    use crate::models::Document;
    use crate::schema::FieldMappings;
    use tempfile::TempDir;

    fn snapshot() -> EngineSnapshot {
        EngineSnapshot::new(
            EngineSettings::default(),
            FieldMappings::new(),
            vec![SnapshotDocument {
                document: Document::new("a").with_field("title", "hello"),
                seq: 0,
            }],
        )
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let store = FileSnapshotStore::new(dir.path().join("engine.snap"));
        assert!(store.load().unwrap().is_none());

        store.save(&snapshot()).unwrap();
        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded.documents, snapshot().documents);
        assert!(!store.temp_path().exists());
    }

    #[test]
    fn test_corruption_detected() {
        let dir = TempDir::new().unwrap();
        let store = FileSnapshotStore::new(dir.path().join("engine.snap"));
        store.save(&snapshot()).unwrap();

        let mut bytes = fs::read(store.path()).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0x55;
        fs::write(store.path(), bytes).unwrap();
        assert!(matches!(
            store.load(),
            Err(QuarryError::ChecksumMismatch { .. })
        ));

        fs::write(store.path(), [1u8, 2]).unwrap();
        assert!(matches!(store.load(), Err(QuarryError::Persistence(_))));
    }

    #[test]
    fn test_newer_version_rejected() {
        let dir = TempDir::new().unwrap();
        let store = FileSnapshotStore::new(dir.path().join("engine.snap"));
        let mut newer = snapshot();
        newer.version = SNAPSHOT_VERSION + 1;
        store.save(&newer).unwrap();
        assert!(matches!(
            store.load(),
            Err(QuarryError::IncompatibleSnapshot { .. })
        ));
    }
}

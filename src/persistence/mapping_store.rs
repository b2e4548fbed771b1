use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::MappingStore;
use crate::error::Result;
use crate::schema::FieldMappings;

/// Field mappings stored as a pretty-printed JSON object
pub struct JsonMappingStore {
    path: PathBuf,
}

impl JsonMappingStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl MappingStore for JsonMappingStore {
    fn load(&self) -> Result<Option<FieldMappings>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let text = fs::read_to_string(&self.path)?;
        let mappings: FieldMappings = serde_json::from_str(&text)?;
        debug!(path = %self.path.display(), fields = mappings.len(), "mappings loaded");
        Ok(Some(mappings))
    }

    fn save(&self, mappings: &FieldMappings) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(mappings)?)?;
        Ok(())
    }
}

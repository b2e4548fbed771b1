use serde::{Deserialize, Serialize};

use super::document::{Document, DocumentId};

/// Mutations recorded in the write-ahead log and replayed on open
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Command {
    IndexDocument(Document),
    DeleteDocument(DocumentId),
}

impl Command {
    /// Get the command name for logging
    pub fn name(&self) -> &'static str {
        match self {
            Command::IndexDocument(_) => "index_document",
            Command::DeleteDocument(_) => "delete_document",
        }
    }

    /// Id of the document the command touches
    pub fn document_id(&self) -> &str {
        match self {
            Command::IndexDocument(doc) => &doc.id,
            Command::DeleteDocument(id) => id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_names() {
        let index = Command::IndexDocument(Document::new("a"));
        assert_eq!(index.name(), "index_document");
        assert_eq!(index.document_id(), "a");

        let delete = Command::DeleteDocument("b".to_string());
        assert_eq!(delete.name(), "delete_document");
        assert_eq!(delete.document_id(), "b");
    }

    #[test]
    fn test_command_bincode() {
        let cmd = Command::IndexDocument(Document::new("x").with_field("n", 1.0));
        let bytes = bincode::serialize(&cmd).unwrap();
        let back: Command = bincode::deserialize(&bytes).unwrap();
        assert_eq!(back, cmd);
    }
}

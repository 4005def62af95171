use crate::stream::{CommitId, StreamId};
use serde::{Deserialize, Serialize};

/// The config file consumed by the notes application.
///
/// Field names and nesting are a compatibility contract with downstream
/// readers and must not change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BootstrapConfigRecord {
    pub definitions: DefinitionAddresses,
    pub schemas: SchemaAddresses,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefinitionAddresses {
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaAddresses {
    #[serde(rename = "EncryptedNote")]
    pub encrypted_note: String,
    #[serde(rename = "NotesList")]
    pub notes_list: String,
}

impl BootstrapConfigRecord {
    pub fn new(notes: &StreamId, encrypted_note: &CommitId, notes_list: &CommitId) -> Self {
        Self {
            definitions: DefinitionAddresses {
                notes: notes.to_url(),
            },
            schemas: SchemaAddresses {
                encrypted_note: encrypted_note.to_url(),
                notes_list: notes_list.to_url(),
            },
        }
    }
}

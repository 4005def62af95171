use crate::stream::CommitId;
use serde::{Deserialize, Serialize};

/// Content of a definition document: a named dataset bound to one schema commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Definition {
    pub name: String,
    pub description: String,
    /// Commit URL of the schema, `ceramic://<id>?version=<commit>`.
    pub schema: String,
}

impl Definition {
    pub fn new(name: impl Into<String>, description: impl Into<String>, schema: &CommitId) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            schema: schema.to_url(),
        }
    }
}

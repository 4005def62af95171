use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub const CERAMIC_URL_SCHEME: &str = "ceramic://";
const VERSION_QUERY: &str = "?version=";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StreamIdError {
    #[error("stream id is empty")]
    Empty,

    #[error("stream id '{0}' contains invalid characters")]
    InvalidCharacters(String),

    #[error("commit address '{0}' has no version")]
    MissingVersion(String),
}

/// Address of a stream, independent of any particular commit.
///
/// Parses from either the bare id or its `ceramic://<id>` URL form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StreamId(String);

impl StreamId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `ceramic://<id>`
    pub fn to_url(&self) -> String {
        format!("{}{}", CERAMIC_URL_SCHEME, self.0)
    }

    /// Pin this stream at `version`.
    pub fn at_commit(&self, version: impl Into<String>) -> Result<CommitId, StreamIdError> {
        let version = validate_segment(version.into())?;
        Ok(CommitId {
            stream: self.clone(),
            version,
        })
    }
}

fn validate_segment(s: String) -> Result<String, StreamIdError> {
    if s.is_empty() {
        return Err(StreamIdError::Empty);
    }
    if s.chars().any(|c| c.is_whitespace() || matches!(c, '?' | '/' | '#' | '=' | '&')) {
        return Err(StreamIdError::InvalidCharacters(s));
    }
    Ok(s)
}

impl FromStr for StreamId {
    type Err = StreamIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bare = s.strip_prefix(CERAMIC_URL_SCHEME).unwrap_or(s);
        validate_segment(bare.to_string()).map(StreamId)
    }
}

impl TryFrom<String> for StreamId {
    type Error = StreamIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<StreamId> for String {
    fn from(id: StreamId) -> Self {
        id.0
    }
}

impl fmt::Display for StreamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Address pinning one version of a stream: `ceramic://<id>?version=<commit>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CommitId {
    stream: StreamId,
    version: String,
}

impl CommitId {
    pub fn stream(&self) -> &StreamId {
        &self.stream
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn to_url(&self) -> String {
        format!("{}{}{}", self.stream.to_url(), VERSION_QUERY, self.version)
    }
}

impl FromStr for CommitId {
    type Err = StreamIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bare = s.strip_prefix(CERAMIC_URL_SCHEME).unwrap_or(s);
        let (stream, version) = bare
            .split_once(VERSION_QUERY)
            .ok_or_else(|| StreamIdError::MissingVersion(s.to_string()))?;
        stream.parse::<StreamId>()?.at_commit(version)
    }
}

impl fmt::Display for CommitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_url())
    }
}

/// A published schema: its stream and the commit that pins its content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaRef {
    pub stream: StreamId,
    pub commit: CommitId,
}

impl From<CommitId> for SchemaRef {
    fn from(commit: CommitId) -> Self {
        Self {
            stream: commit.stream().clone(),
            commit,
        }
    }
}

/// A created definition, addressed by stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefinitionRef {
    pub stream: StreamId,
}

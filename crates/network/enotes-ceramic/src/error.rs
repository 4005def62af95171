use enotes_identity::SessionError;
use thiserror::Error;

/// Errors from writes to the document network.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// Timeouts, refused connections and 5xx answers. Retrying may help.
    #[error("network error calling {url}: {reason}")]
    Network { url: String, reason: String },

    /// The remote party validated and refused the request. Retrying will not help.
    #[error("request to {url} rejected (HTTP {status}): {reason}")]
    Rejected { url: String, status: u16, reason: String },

    #[error("session cannot sign the write: {0}")]
    Session(#[from] SessionError),

    #[error("failed to encode document: {0}")]
    Encoding(#[from] serde_json::Error),
}

impl DocumentError {
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Network { .. })
    }
}

use enotes_ceramic::DocumentError;
use enotes_identity::{ResolverError, SecretError, SessionError};
use enotes_types::SchemaError;
use std::path::PathBuf;
use thiserror::Error;

/// Failures writing the config record to disk.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("invalid output path '{}': {reason}", path.display())]
    InvalidPath { path: PathBuf, reason: String },

    #[error("I/O error writing '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize config for '{}': {source}", path.display())]
    Serialization {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("config write for '{}' did not complete: {reason}", path.display())]
    Interrupted { path: PathBuf, reason: String },
}

/// Every way a bootstrap run can fail. All of them end the run.
#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("invalid secret: {0}")]
    InvalidSecret(#[from] SecretError),

    #[error("unsupported DID method '{method}' for {did}")]
    UnsupportedMethod { method: String, did: String },

    #[error("DID resolution failed: {0}")]
    Resolution(String),

    #[error("authentication failed: {0}")]
    Authentication(String),

    #[error("network error calling {url}: {reason}")]
    Network { url: String, reason: String },

    #[error("rejected by {url} (HTTP {status}): {reason}")]
    Rejected { url: String, status: u16, reason: String },

    #[error("write attempted without an authenticated session: {0}")]
    NotAuthenticated(String),

    #[error("invalid schema definition: {0}")]
    InvalidSchema(#[from] SchemaError),

    #[error("failed to encode document: {0}")]
    Encoding(#[from] serde_json::Error),

    #[error("failed to persist config: {0}")]
    Persistence(#[from] PersistenceError),

    #[error("bootstrap workflow has already run")]
    AlreadyRun,
}

impl BootstrapError {
    /// Only network trouble is worth re-running unchanged.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Network { .. })
    }

    /// Process exit status for this failure.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Config(_) | Self::InvalidSecret(_) => 2,
            Self::UnsupportedMethod { .. } | Self::Resolution(_) | Self::Authentication(_) => 3,
            Self::Network { .. } => 4,
            Self::Rejected { .. } => 5,
            Self::Persistence(_) => 6,
            Self::NotAuthenticated(_)
            | Self::InvalidSchema(_)
            | Self::Encoding(_)
            | Self::AlreadyRun => 70,
        }
    }
}

impl From<ResolverError> for BootstrapError {
    fn from(err: ResolverError) -> Self {
        match err {
            ResolverError::UnsupportedMethod { method, did } => Self::UnsupportedMethod { method, did },
            other => Self::Resolution(other.to_string()),
        }
    }
}

impl From<SessionError> for BootstrapError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::NotAuthenticated(state) => Self::NotAuthenticated(format!("session state is {:?}", state)),
            other => Self::Authentication(other.to_string()),
        }
    }
}

impl From<DocumentError> for BootstrapError {
    fn from(err: DocumentError) -> Self {
        match err {
            DocumentError::Network { url, reason } => Self::Network { url, reason },
            DocumentError::Rejected { url, status, reason } => Self::Rejected { url, status, reason },
            DocumentError::Session(e) => e.into(),
            DocumentError::Encoding(e) => Self::Encoding(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use enotes_identity::SessionState;

    #[test]
    fn exit_codes_distinguish_failure_kinds() {
        let network: BootstrapError = DocumentError::Network {
            url: "u".into(),
            reason: "timeout".into(),
        }
        .into();
        assert_eq!(network.exit_code(), 4);
        assert!(network.is_transient());

        let rejected: BootstrapError = DocumentError::Rejected {
            url: "u".into(),
            status: 422,
            reason: "bad".into(),
        }
        .into();
        assert_eq!(rejected.exit_code(), 5);
        assert!(!rejected.is_transient());

        let secret: BootstrapError = SecretError::Missing("SEED".into()).into();
        assert_eq!(secret.exit_code(), 2);

        let auth: BootstrapError = SessionError::Authentication("nope".into()).into();
        assert_eq!(auth.exit_code(), 3);
        assert!(!auth.is_transient());

        let persistence: BootstrapError = PersistenceError::InvalidPath {
            path: "/".into(),
            reason: "no file name".into(),
        }
        .into();
        assert_eq!(persistence.exit_code(), 6);
    }

    #[test]
    fn session_errors_inside_document_errors_keep_their_kind() {
        let err: BootstrapError =
            DocumentError::Session(SessionError::NotAuthenticated(SessionState::Unauthenticated)).into();
        assert_matches!(err, BootstrapError::NotAuthenticated(_));
        assert_eq!(err.exit_code(), 70);
    }

    #[test]
    fn resolver_errors_map_to_taxonomy() {
        let err: BootstrapError = ResolverError::UnsupportedMethod {
            method: "web".into(),
            did: "did:web:x".into(),
        }
        .into();
        assert_matches!(err, BootstrapError::UnsupportedMethod { ref method, .. } if method == "web");
        assert_eq!(err.exit_code(), 3);

        let err: BootstrapError = ResolverError::DuplicateMethod("key".into()).into();
        assert_matches!(err, BootstrapError::Resolution(_));
    }
}

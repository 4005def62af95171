use crate::error::DocumentError;
use crate::genesis::Genesis;
use async_trait::async_trait;
use enotes_identity::Session;
use enotes_types::{CommitId, StreamId};

/// Signed document creation on the network.
///
/// Each call is one round trip with no retry. Implementations hold no
/// client-side mutable state, so calls may run concurrently.
#[async_trait]
pub trait DocumentNetwork: Send + Sync {
    /// Publish a document that is never updated; returns its genesis commit.
    async fn create_immutable(&self, session: &Session, genesis: &Genesis) -> Result<CommitId, DocumentError>;

    /// Create an updatable document; returns its stream address.
    async fn create_mutable(&self, session: &Session, genesis: &Genesis) -> Result<StreamId, DocumentError>;
}

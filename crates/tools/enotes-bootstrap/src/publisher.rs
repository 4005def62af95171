use crate::error::BootstrapError;
use enotes_ceramic::{DocumentNetwork, Genesis};
use enotes_identity::Session;
use enotes_types::{SchemaDocument, SchemaRef};

/// Publishes schema documents as immutable streams.
pub struct SchemaPublisher<'a, N: DocumentNetwork + ?Sized> {
    network: &'a N,
}

impl<'a, N: DocumentNetwork + ?Sized> SchemaPublisher<'a, N> {
    pub fn new(network: &'a N) -> Self {
        Self { network }
    }

    /// The genesis is deterministic, so publishing the same schema twice
    /// from the same controller addresses the same stream.
    pub async fn publish(&self, session: &Session, schema: &SchemaDocument) -> Result<SchemaRef, BootstrapError> {
        let content = serde_json::to_value(schema)?;
        let genesis = Genesis::deterministic(session.did(), content);

        tracing::debug!(title = schema.title(), "publishing schema");
        let commit = self.network.create_immutable(session, &genesis).await?;
        tracing::info!(title = schema.title(), commit = %commit, "schema published");

        Ok(SchemaRef::from(commit))
    }
}

use crate::error::BootstrapError;
use enotes_ceramic::{DocumentNetwork, Genesis};
use enotes_identity::Session;
use enotes_types::{CommitId, Definition, DefinitionRef};

/// Creates the mutable definition document pointing at a published schema.
pub struct DefinitionLinker<'a, N: DocumentNetwork + ?Sized> {
    network: &'a N,
}

impl<'a, N: DocumentNetwork + ?Sized> DefinitionLinker<'a, N> {
    pub fn new(network: &'a N) -> Self {
        Self { network }
    }

    /// Every call creates a new stream. A `schema` the network has never
    /// seen comes back as `Rejected`.
    pub async fn create_definition(
        &self,
        session: &Session,
        name: &str,
        description: &str,
        schema: &CommitId,
        definition_schema: Option<&CommitId>,
    ) -> Result<DefinitionRef, BootstrapError> {
        let content = serde_json::to_value(Definition::new(name, description, schema))?;
        let mut genesis = Genesis::unique(session.did(), content);
        if let Some(meta) = definition_schema {
            genesis = genesis.with_schema(meta);
        }

        let stream = self.network.create_mutable(session, &genesis).await?;
        tracing::info!(name, stream = %stream, schema = %schema, "definition created");

        Ok(DefinitionRef { stream })
    }
}

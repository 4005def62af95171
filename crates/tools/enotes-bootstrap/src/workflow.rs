use crate::error::BootstrapError;
use crate::linker::DefinitionLinker;
use crate::materializer::ConfigWriter;
use crate::publisher::SchemaPublisher;
use crate::schemas;
use crate::settings::DefinitionSettings;
use enotes_ceramic::DocumentNetwork;
use enotes_identity::{ChallengeEndpoint, Resolver, Session, SigningCapability};
use enotes_types::{BootstrapConfigRecord, CommitId};
use std::path::PathBuf;
use std::sync::Arc;

/// Progress of a [`BootstrapWorkflow`]. Steps only move forward; any error
/// ends in `Failed`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BootstrapState {
    Start,
    SecretLoaded,
    SessionAuthenticated,
    SchemasPublished,
    DefinitionCreated,
    ConfigWritten,
    Failed(String),
}

/// One bootstrap run: authenticate, publish both schemas, link the
/// definition, write the config record.
pub struct BootstrapWorkflow<N, W> {
    network: Arc<N>,
    writer: Arc<W>,
    resolver: Arc<Resolver>,
    definition: DefinitionSettings,
    output: PathBuf,
    state: BootstrapState,
}

impl<N, W> BootstrapWorkflow<N, W>
where
    N: DocumentNetwork + ChallengeEndpoint,
    W: ConfigWriter,
{
    pub fn new(
        network: Arc<N>,
        writer: Arc<W>,
        resolver: Arc<Resolver>,
        definition: DefinitionSettings,
        output: impl Into<PathBuf>,
    ) -> Self {
        Self {
            network,
            writer,
            resolver,
            definition,
            output: output.into(),
            state: BootstrapState::Start,
        }
    }

    pub fn state(&self) -> &BootstrapState {
        &self.state
    }

    /// Run every step once. A workflow cannot be re-run, failed or not.
    pub async fn run(&mut self, secret: &str) -> Result<BootstrapConfigRecord, BootstrapError> {
        if self.state != BootstrapState::Start {
            return Err(BootstrapError::AlreadyRun);
        }
        match self.execute(secret).await {
            Ok(record) => Ok(record),
            Err(err) => {
                tracing::error!(state = ?self.state, transient = err.is_transient(), "bootstrap failed: {}", err);
                self.state = BootstrapState::Failed(err.to_string());
                Err(err)
            }
        }
    }

    async fn execute(&mut self, secret: &str) -> Result<BootstrapConfigRecord, BootstrapError> {
        let definition_schema = self
            .definition
            .schema
            .as_deref()
            .map(str::parse::<CommitId>)
            .transpose()
            .map_err(|e| BootstrapError::Config(format!("definition schema: {}", e)))?;

        let capability = SigningCapability::from_hex(secret)?;
        self.transition(BootstrapState::SecretLoaded);

        let mut session = Session::new(capability, self.resolver.clone());
        session.authenticate(self.network.as_ref()).await?;
        self.transition(BootstrapState::SessionAuthenticated);

        let encrypted_note = schemas::encrypted_note()?;
        let notes_list = schemas::notes_list()?;
        let publisher = SchemaPublisher::new(self.network.as_ref());
        let (note_schema, list_schema) = tokio::try_join!(
            publisher.publish(&session, &encrypted_note),
            publisher.publish(&session, &notes_list),
        )?;
        self.transition(BootstrapState::SchemasPublished);

        let definition = DefinitionLinker::new(self.network.as_ref())
            .create_definition(
                &session,
                &self.definition.name,
                &self.definition.description,
                &list_schema.commit,
                definition_schema.as_ref(),
            )
            .await?;
        self.transition(BootstrapState::DefinitionCreated);

        let record = BootstrapConfigRecord::new(&definition.stream, &note_schema.commit, &list_schema.commit);
        self.writer.write(&record, &self.output).await?;
        self.transition(BootstrapState::ConfigWritten);

        Ok(record)
    }

    fn transition(&mut self, next: BootstrapState) {
        tracing::info!(from = ?self.state, to = ?next, "bootstrap state transition");
        self.state = next;
    }
}

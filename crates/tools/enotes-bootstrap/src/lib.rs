//! Bootstraps the encrypted-notes application on a Ceramic node.
//!
//! Proves control of the operator's DID, publishes the `EncryptedNote` and
//! `NotesList` schemas, creates the `notes` definition and writes the
//! resulting addresses to a JSON config file.

pub mod error;
pub mod linker;
pub mod materializer;
pub mod publisher;
pub mod schemas;
pub mod settings;
pub mod workflow;

pub use error::{BootstrapError, PersistenceError};
pub use materializer::{write_atomic, ConfigWriter, FileConfigWriter};
pub use settings::{DefinitionSettings, Settings};
pub use workflow::{BootstrapState, BootstrapWorkflow};

use enotes_ceramic::HttpCeramicClient;
use enotes_identity::{KeyDidResolver, Resolver, ThreeIdResolver};
use enotes_types::BootstrapConfigRecord;
use std::sync::Arc;

/// Run a full bootstrap against the node named in `settings`.
pub async fn bootstrap(settings: &Settings, secret: &str) -> Result<BootstrapConfigRecord, BootstrapError> {
    let client = Arc::new(HttpCeramicClient::new(
        settings.ceramic_url.as_str(),
        settings.request_timeout(),
    )?);
    let resolver = Resolver::new()
        .with(Arc::new(KeyDidResolver))?
        .with(Arc::new(ThreeIdResolver::new(client.clone())))?;

    tracing::info!(
        ceramic_url = client.base_url(),
        output = %settings.output_path.display(),
        "starting bootstrap"
    );

    let mut workflow = BootstrapWorkflow::new(
        client,
        Arc::new(FileConfigWriter),
        Arc::new(resolver),
        settings.definition.clone(),
        settings.output_path.clone(),
    );
    workflow.run(secret).await
}

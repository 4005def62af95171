pub mod definition;
pub mod record;
pub mod schema;
pub mod stream;

pub use definition::Definition;
pub use record::{BootstrapConfigRecord, DefinitionAddresses, SchemaAddresses};
pub use schema::{SchemaDocument, SchemaError, SchemaNode, DRAFT_07};
pub use stream::{CommitId, DefinitionRef, SchemaRef, StreamId, StreamIdError, CERAMIC_URL_SCHEME};

//! Access to a Ceramic-style document network.
//!
//! [`DocumentNetwork`] is the seam the bootstrap workflow writes through;
//! [`HttpCeramicClient`] implements it over the node's HTTP API and also
//! serves as the session's challenge endpoint and the `did:3` stream loader.

mod client;
mod error;
mod genesis;
mod network;

pub use client::{HttpCeramicClient, DEFAULT_CERAMIC_URL, DEFAULT_REQUEST_TIMEOUT};
pub use error::DocumentError;
pub use genesis::{Genesis, GenesisHeader};
pub use network::DocumentNetwork;

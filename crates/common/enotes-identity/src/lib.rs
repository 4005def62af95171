//! Identity layer for the encrypted-notes bootstrap.
//!
//! - `did:key` identifiers for Ed25519 keys (`multicodec: 0xed01`, `multibase: base58btc`).
//! - [`SigningCapability`] wraps the caller-supplied seed.
//! - [`Resolver`] composes per-method resolution strategies (`did:key`, `did:3`).
//! - [`Session`] proves control of the DID to a remote party and signs writes.

#![forbid(unsafe_code)]

mod did;
mod provider;
pub mod resolver;
mod session;

pub use did::{
    decode_ed25519_multibase, encode_ed25519_multibase, Did, DidError, ED25519_KEY_LENGTH,
    ED25519_MULTICODEC_PREFIX, KEY_METHOD,
};
pub use provider::{SecretError, SigningCapability};
pub use resolver::{
    KeyDidResolver, MethodResolver, Resolver, ResolverError, StreamLoader, ThreeIdResolver,
    VerificationMaterial,
};
pub use session::{AuthProof, Challenge, ChallengeEndpoint, Session, SessionError, SessionState};

//! Composable DID resolution.
//!
//! A [`Resolver`] dispatches on the identifier's method name to one of the
//! registered [`MethodResolver`] strategies. Method names must be disjoint.

mod key;
mod three;

pub use key::KeyDidResolver;
pub use three::{StreamLoader, ThreeIdResolver, THREE_ID_METHOD};

use crate::did::Did;
use async_trait::async_trait;
use ed25519_dalek::VerifyingKey;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResolverError {
    #[error("no resolver registered for DID method '{method}' ({did})")]
    UnsupportedMethod { method: String, did: String },

    #[error("failed to resolve {did}: {reason}")]
    Resolution { did: String, reason: String },

    #[error("a resolver for DID method '{0}' is already registered")]
    DuplicateMethod(String),
}

impl ResolverError {
    pub fn resolution(did: &Did, reason: impl ToString) -> Self {
        Self::Resolution {
            did: did.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Public keys able to verify signatures made on behalf of a DID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationMaterial {
    pub id: Did,
    pub keys: Vec<VerifyingKey>,
}

/// One resolution strategy, bound to a single DID method.
#[async_trait]
pub trait MethodResolver: Send + Sync {
    fn method(&self) -> &str;

    async fn resolve(&self, did: &Did) -> Result<VerificationMaterial, ResolverError>;
}

/// Aggregate of method resolvers, dispatched by method name.
#[derive(Clone, Default)]
pub struct Resolver {
    methods: HashMap<String, Arc<dyn MethodResolver>>,
}

impl Resolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a strategy. Fails if its method is already taken.
    pub fn register(&mut self, strategy: Arc<dyn MethodResolver>) -> Result<(), ResolverError> {
        let method = strategy.method().to_string();
        if self.methods.contains_key(&method) {
            return Err(ResolverError::DuplicateMethod(method));
        }
        self.methods.insert(method, strategy);
        Ok(())
    }

    /// Builder-style [`register`](Self::register).
    pub fn with(mut self, strategy: Arc<dyn MethodResolver>) -> Result<Self, ResolverError> {
        self.register(strategy)?;
        Ok(self)
    }

    pub async fn resolve(&self, did: &Did) -> Result<VerificationMaterial, ResolverError> {
        let strategy = self
            .methods
            .get(did.method())
            .ok_or_else(|| ResolverError::UnsupportedMethod {
                method: did.method().to_string(),
                did: did.to_string(),
            })?;

        tracing::debug!(did = %did, method = did.method(), "resolving DID");
        strategy.resolve(did).await
    }
}

impl std::fmt::Debug for Resolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut methods: Vec<&String> = self.methods.keys().collect();
        methods.sort();
        f.debug_struct("Resolver").field("methods", &methods).finish()
    }
}

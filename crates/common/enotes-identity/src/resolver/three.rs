use super::{MethodResolver, ResolverError, VerificationMaterial};
use crate::did::{decode_ed25519_multibase, Did};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

pub const THREE_ID_METHOD: &str = "3";

/// Read access to the current content of a document-network stream.
#[async_trait]
pub trait StreamLoader: Send + Sync {
    async fn load_content(&self, stream_id: &str) -> anyhow::Result<Value>;
}

/// Resolves document-anchored `did:3` identifiers.
///
/// The method-specific id names a stream whose content holds a
/// `publicKeys` map of multibase-encoded keys. Only Ed25519 keys are kept.
#[derive(Clone)]
pub struct ThreeIdResolver {
    loader: Arc<dyn StreamLoader>,
}

impl ThreeIdResolver {
    pub fn new(loader: Arc<dyn StreamLoader>) -> Self {
        Self { loader }
    }
}

#[async_trait]
impl MethodResolver for ThreeIdResolver {
    fn method(&self) -> &str {
        THREE_ID_METHOD
    }

    async fn resolve(&self, did: &Did) -> Result<VerificationMaterial, ResolverError> {
        let content = self
            .loader
            .load_content(did.method_specific_id())
            .await
            .map_err(|e| ResolverError::resolution(did, format!("{:#}", e)))?;

        let public_keys = content
            .get("publicKeys")
            .and_then(Value::as_object)
            .ok_or_else(|| ResolverError::resolution(did, "document has no publicKeys map"))?;

        let keys: Vec<_> = public_keys
            .iter()
            .filter_map(|(name, encoded)| {
                let encoded = encoded.as_str()?;
                match decode_ed25519_multibase(encoded) {
                    Ok(key) => Some(key),
                    Err(e) => {
                        tracing::debug!(did = %did, key = %name, "skipping public key: {}", e);
                        None
                    }
                }
            })
            .collect();

        if keys.is_empty() {
            return Err(ResolverError::resolution(did, "document lists no Ed25519 keys"));
        }

        Ok(VerificationMaterial {
            id: did.clone(),
            keys,
        })
    }
}

use super::{MethodResolver, ResolverError, VerificationMaterial};
use crate::did::{Did, KEY_METHOD};
use async_trait::async_trait;

/// Resolves `did:key` identifiers from the key embedded in the identifier.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyDidResolver;

#[async_trait]
impl MethodResolver for KeyDidResolver {
    fn method(&self) -> &str {
        KEY_METHOD
    }

    async fn resolve(&self, did: &Did) -> Result<VerificationMaterial, ResolverError> {
        let key = did
            .ed25519_key()
            .map_err(|e| ResolverError::resolution(did, e))?;
        Ok(VerificationMaterial {
            id: did.clone(),
            keys: vec![key],
        })
    }
}

use crate::did::{Did, ED25519_KEY_LENGTH};
use ed25519_dalek::{SigningKey, VerifyingKey};
use enotes_crypto::{sign_detached_jws, JwsError};
use std::fmt;
use thiserror::Error;
use zeroize::Zeroizing;

/// Errors raised while turning caller-supplied seed material into a signer.
#[derive(Debug, Error)]
pub enum SecretError {
    #[error("secret not supplied (expected hex seed in {0})")]
    Missing(String),

    #[error("secret must be {expected} bytes, got {found}")]
    InvalidLength { expected: usize, found: usize },

    #[error("secret is not valid hex: {0}")]
    InvalidEncoding(#[from] hex::FromHexError),
}

/// Ed25519 signing capability derived from a 32-byte seed.
///
/// The seed is owned exclusively by this value, is never serialized and is
/// redacted from `Debug` output. `SigningKey` zeroizes itself on drop.
pub struct SigningCapability {
    sk: SigningKey,
    did: Did,
}

impl SigningCapability {
    /// Wrap raw seed bytes. Anything but exactly 32 bytes is rejected.
    pub fn wrap(secret: &[u8]) -> Result<Self, SecretError> {
        let seed: &[u8; ED25519_KEY_LENGTH] =
            secret.try_into().map_err(|_| SecretError::InvalidLength {
                expected: ED25519_KEY_LENGTH,
                found: secret.len(),
            })?;
        let sk = SigningKey::from_bytes(seed);
        let did = Did::from_ed25519(&sk.verifying_key());
        Ok(Self { sk, did })
    }

    /// Decode a hex seed (as supplied through the environment) and wrap it.
    pub fn from_hex(secret_hex: &str) -> Result<Self, SecretError> {
        let bytes = Zeroizing::new(hex::decode(secret_hex.trim())?);
        Self::wrap(&bytes)
    }

    /// The `did:key` controlled by this capability.
    pub fn did(&self) -> &Did {
        &self.did
    }

    pub fn verifying_key(&self) -> VerifyingKey {
        self.sk.verifying_key()
    }

    /// Produce a detached JWS over `payload`, with the DID as `kid`.
    pub fn sign_jws(&self, payload: &[u8]) -> Result<String, JwsError> {
        sign_detached_jws(payload, &self.sk, Some(self.did.as_str()))
    }
}

impl fmt::Debug for SigningCapability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningCapability")
            .field("did", &self.did)
            .field("sk", &"<redacted>")
            .finish()
    }
}

use ed25519_dalek::VerifyingKey;
use multibase::Base;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Unsigned-varint multicodec prefix for `ed25519-pub` (0xed).
pub const ED25519_MULTICODEC_PREFIX: [u8; 2] = [0xed, 0x01];
pub const ED25519_KEY_LENGTH: usize = 32;

/// Method name of identifiers that embed their own public key.
pub const KEY_METHOD: &str = "key";

/// Error type for DID operations.
#[derive(Debug, Error)]
pub enum DidError {
    #[error("DID string is empty")]
    EmptyInput,

    #[error("invalid DID scheme prefix '{0}', expected 'did'")]
    InvalidPrefix(String),

    #[error("DID method is missing or contains invalid characters: '{0}'")]
    InvalidMethod(String),

    #[error("method-specific identifier is missing")]
    MissingMethodSpecificId,

    #[error("DID method '{0}' does not embed key material")]
    NotKeyMethod(String),

    #[error("invalid multibase encoding for '{identifier_part}': {reason}")]
    InvalidMethodSpecificIdEncoding { identifier_part: String, reason: String },

    #[error("unsupported key multicodec: expected {expected:02x?}, found {found:02x?}")]
    UnsupportedKeyMulticodec { expected: [u8; 2], found: Vec<u8> },

    #[error("invalid key length: expected {expected_len} bytes, found {found_len}")]
    InvalidKeyLength { expected_len: usize, found_len: usize },

    #[error("invalid Ed25519 key bytes: {0}")]
    InvalidKeyBytes(#[from] ed25519_dalek::SignatureError),
}

/// A W3C-style Decentralized Identifier: `did:<method>:<method-specific-id>`.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Did(String);

impl Did {
    /// Construct a `did:key` from an Ed25519 public key.
    pub fn from_ed25519(pk: &VerifyingKey) -> Self {
        Self(format!("did:{}:{}", KEY_METHOD, encode_ed25519_multibase(pk)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The method name, e.g. `key` or `3`.
    pub fn method(&self) -> &str {
        self.parts().0
    }

    pub fn method_specific_id(&self) -> &str {
        self.parts().1
    }

    /// Decode the Ed25519 key embedded in a `did:key` identifier.
    pub fn ed25519_key(&self) -> Result<VerifyingKey, DidError> {
        if self.method() != KEY_METHOD {
            return Err(DidError::NotKeyMethod(self.method().to_string()));
        }
        decode_ed25519_multibase(self.method_specific_id())
    }

    fn parts(&self) -> (&str, &str) {
        // Validated on construction: "did:" + method + ":" + id.
        let rest = &self.0[4..];
        rest.split_once(':').unwrap_or((rest, ""))
    }
}

/// Multibase (base58btc) encoding of a multicodec-prefixed Ed25519 key.
pub fn encode_ed25519_multibase(pk: &VerifyingKey) -> String {
    let mut bytes = Vec::with_capacity(ED25519_MULTICODEC_PREFIX.len() + ED25519_KEY_LENGTH);
    bytes.extend_from_slice(&ED25519_MULTICODEC_PREFIX);
    bytes.extend_from_slice(pk.as_bytes());
    multibase::encode(Base::Base58Btc, bytes)
}

/// Inverse of [`encode_ed25519_multibase`].
pub fn decode_ed25519_multibase(encoded: &str) -> Result<VerifyingKey, DidError> {
    let (_, data) = multibase::decode(encoded).map_err(|e| DidError::InvalidMethodSpecificIdEncoding {
        identifier_part: encoded.to_string(),
        reason: e.to_string(),
    })?;

    if data.len() < ED25519_MULTICODEC_PREFIX.len() || data[..2] != ED25519_MULTICODEC_PREFIX {
        return Err(DidError::UnsupportedKeyMulticodec {
            expected: ED25519_MULTICODEC_PREFIX,
            found: data.iter().take(2).copied().collect(),
        });
    }

    let key_bytes =
        <[u8; ED25519_KEY_LENGTH]>::try_from(&data[2..]).map_err(|_| DidError::InvalidKeyLength {
            expected_len: ED25519_KEY_LENGTH,
            found_len: data.len() - 2,
        })?;

    Ok(VerifyingKey::from_bytes(&key_bytes)?)
}

impl FromStr for Did {
    type Err = DidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(DidError::EmptyInput);
        }
        let mut parts = s.splitn(3, ':');
        let scheme = parts.next().unwrap_or_default();
        if scheme != "did" {
            return Err(DidError::InvalidPrefix(scheme.to_string()));
        }
        let method = parts.next().unwrap_or_default();
        if method.is_empty()
            || !method
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        {
            return Err(DidError::InvalidMethod(method.to_string()));
        }
        match parts.next() {
            Some(id) if !id.is_empty() => {}
            _ => return Err(DidError::MissingMethodSpecificId),
        }

        let did = Did(s.to_string());
        if did.method() == KEY_METHOD {
            did.ed25519_key()?;
        }
        Ok(did)
    }
}

impl TryFrom<String> for Did {
    type Error = DidError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Did> for String {
    fn from(did: Did) -> Self {
        did.0
    }
}

impl fmt::Display for Did {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

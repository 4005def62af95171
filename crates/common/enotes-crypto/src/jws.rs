use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use ed25519_dalek::{Signature, SignatureError as Ed25519SignatureError, Signer, SigningKey, VerifyingKey};
use serde::{Deserialize, Serialize};
use signature::Verifier;
use thiserror::Error;

const JWS_ALG_EDDSA: &str = "EdDSA";

/// Failures producing or checking a detached JWS.
#[derive(Error, Debug)]
pub enum JwsError {
    #[error("JWS header is not valid JSON: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("JWS segment is not base64url: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("detached JWS must have 3 dot-separated segments, found {actual_parts}")]
    IncorrectJwsPartsCount { actual_parts: usize },

    #[error("detached JWS carries an inline payload")]
    PayloadPresentInDetachedJws,

    #[error("JWS algorithm '{0}' is not supported (expected EdDSA)")]
    UnsupportedAlgorithm(String),

    #[error("signature must be {expected_len} bytes, found {found_len}")]
    InvalidSignatureLength { expected_len: usize, found_len: usize },

    #[error("signature does not verify: {0}")]
    CryptoVerification(#[from] Ed25519SignatureError),
}

pub type Result<T> = std::result::Result<T, JwsError>;

/// Protected header of a detached JWS.
///
/// `kid` carries the DID (optionally with a key fragment) of the signer so the
/// receiving party knows which verification material to resolve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwsHeader {
    pub alg: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kid: Option<String>,
}

/// Sign `payload` and return a detached JWS.
///
/// Output is `<base64url(header)>..<base64url(signature)>`; the payload
/// travels separately.
pub fn sign_detached_jws(payload: &[u8], key: &SigningKey, kid: Option<&str>) -> Result<String> {
    let header = JwsHeader {
        alg: JWS_ALG_EDDSA.to_string(),
        kid: kid.map(str::to_owned),
    };

    let header_b64 = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&header)?);
    let signing_input = signing_input(&header_b64, payload);

    let signature = key.sign(signing_input.as_bytes());
    let signature_b64 = URL_SAFE_NO_PAD.encode(signature.to_bytes());

    Ok(format!("{}..{}", header_b64, signature_b64))
}

/// Verify a detached JWS against the original payload.
pub fn verify_detached_jws(payload: &[u8], detached_jws: &str, public_key: &VerifyingKey) -> Result<()> {
    let (header_b64, signature_b64) = split_detached(detached_jws)?;

    let header = parse_header(header_b64)?;
    if header.alg != JWS_ALG_EDDSA {
        return Err(JwsError::UnsupportedAlgorithm(header.alg));
    }

    let signature_bytes = URL_SAFE_NO_PAD.decode(signature_b64)?;
    let signature_array: &[u8; 64] = signature_bytes.as_slice().try_into().map_err(|_| {
        JwsError::InvalidSignatureLength {
            expected_len: 64,
            found_len: signature_bytes.len(),
        }
    })?;
    let signature = Signature::from_bytes(signature_array);

    public_key
        .verify(signing_input(header_b64, payload).as_bytes(), &signature)
        .map_err(JwsError::from)
}

/// Decode the protected header without verifying anything.
pub fn decode_header(detached_jws: &str) -> Result<JwsHeader> {
    let (header_b64, _) = split_detached(detached_jws)?;
    parse_header(header_b64)
}

fn split_detached(detached_jws: &str) -> Result<(&str, &str)> {
    let parts: Vec<&str> = detached_jws.split('.').collect();
    if parts.len() != 3 {
        return Err(JwsError::IncorrectJwsPartsCount { actual_parts: parts.len() });
    }
    if !parts[1].is_empty() {
        return Err(JwsError::PayloadPresentInDetachedJws);
    }
    Ok((parts[0], parts[2]))
}

fn parse_header(header_b64: &str) -> Result<JwsHeader> {
    let bytes = URL_SAFE_NO_PAD.decode(header_b64)?;
    Ok(serde_json::from_slice(&bytes)?)
}

fn signing_input(header_b64: &str, payload: &[u8]) -> String {
    format!("{}.{}", header_b64, URL_SAFE_NO_PAD.encode(payload))
}

use assert_matches::assert_matches;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use ed25519_dalek::{SigningKey, VerifyingKey};
use enotes_crypto::{decode_header, sign_detached_jws, verify_detached_jws, JwsError};
use rand::rngs::OsRng;

#[test]
fn test_jws_sign_verify_roundtrip() {
    let signing_key = SigningKey::generate(&mut OsRng);
    let public_key = VerifyingKey::from(&signing_key);

    let payload = b"{\"nonce\":\"abc\"}";
    let detached_jws = sign_detached_jws(payload, &signing_key, Some("did:key:z6Mk-test"))
        .expect("Failed to sign payload");

    assert_matches!(verify_detached_jws(payload, &detached_jws, &public_key), Ok(()));

    // header..signature
    let parts: Vec<&str> = detached_jws.split('.').collect();
    assert_eq!(parts.len(), 3);
    assert!(!parts[0].is_empty(), "Header part should not be empty");
    assert!(parts[1].is_empty(), "Middle part should be empty in detached JWS");
    assert!(!parts[2].is_empty(), "Signature part should not be empty");

    let header = decode_header(&detached_jws).unwrap();
    assert_eq!(header.alg, "EdDSA");
    assert_eq!(header.kid.as_deref(), Some("did:key:z6Mk-test"));
}

#[test]
fn test_jws_rejects_tampering() {
    let signing_key = SigningKey::generate(&mut OsRng);
    let public_key = VerifyingKey::from(&signing_key);
    let payload = b"payload";
    let detached_jws = sign_detached_jws(payload, &signing_key, None).unwrap();

    assert!(verify_detached_jws(b"other payload", &detached_jws, &public_key).is_err());

    let (head, sig_b64) = detached_jws.split_once("..").unwrap();
    let mut sig = URL_SAFE_NO_PAD.decode(sig_b64).unwrap();
    sig[0] ^= 0xFF;
    let tampered = format!("{}..{}", head, URL_SAFE_NO_PAD.encode(sig));
    assert_matches!(
        verify_detached_jws(payload, &tampered, &public_key),
        Err(JwsError::CryptoVerification(_))
    );

    let other_key = SigningKey::generate(&mut OsRng).verifying_key();
    assert!(verify_detached_jws(payload, &detached_jws, &other_key).is_err());
}

#[test]
fn test_jws_structure_errors() {
    let key = SigningKey::generate(&mut OsRng).verifying_key();

    assert_matches!(
        verify_detached_jws(b"x", "only.two", &key),
        Err(JwsError::IncorrectJwsPartsCount { actual_parts: 2 })
    );
    assert_matches!(
        verify_detached_jws(b"x", "a.b.c", &key),
        Err(JwsError::PayloadPresentInDetachedJws)
    );

    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"ES256K"}"#);
    let jws = format!("{}..{}", header, URL_SAFE_NO_PAD.encode([0u8; 64]));
    assert_matches!(
        verify_detached_jws(b"x", &jws, &key),
        Err(JwsError::UnsupportedAlgorithm(alg)) if alg == "ES256K"
    );

    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"EdDSA"}"#);
    let jws = format!("{}..{}", header, URL_SAFE_NO_PAD.encode([0u8; 10]));
    assert_matches!(
        verify_detached_jws(b"x", &jws, &key),
        Err(JwsError::InvalidSignatureLength { expected_len: 64, found_len: 10 })
    );
}

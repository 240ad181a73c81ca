//! Integration tests for detached field signatures.

use std::sync::Arc;

use async_trait::async_trait;
use base64::Engine;
use serde_json::json;

use agentic_wallet::backend::BackendResult;
use agentic_wallet::{
    BackendError, CryptoBackend, KeyStore, Message, SignatureEnvelope, Verkey, WalletError,
    SIG_SPEC_CONST,
};

const SEED: &[u8; 32] = b"000000000000000000000000Trustee1";

async fn envelope() -> (SignatureEnvelope, Verkey) {
    let store = Arc::new(KeyStore::new());
    let verkey = store.create_key(Some(SEED)).await;
    (SignatureEnvelope::new(store), verkey)
}

fn content_message() -> Message {
    Message::from_value(json!({"@type": "T", "@id": "1", "content": {"x": 1}})).unwrap()
}

fn b64(bytes: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

fn b64_decode(text: &str) -> Vec<u8> {
    base64::engine::general_purpose::STANDARD.decode(text).unwrap()
}

#[tokio::test]
async fn sign_content_scenario() {
    let (envelope, verkey) = envelope().await;
    let message = content_message();

    let signed = envelope.sign(&message, "content", verkey.as_str()).await.unwrap();
    assert!(!signed.contains_key("content"));

    let block = signed.get("content~sig").unwrap();
    assert_eq!(block["@type"], SIG_SPEC_CONST);
    assert_eq!(block["sig_data"], b64(br#"{"x":1}"#));
    assert_eq!(block["signers"], verkey.as_str());
    assert_eq!(b64_decode(block["signature"].as_str().unwrap()).len(), 64);

    let opened = envelope.verify(&signed, "content").await.unwrap();
    assert_eq!(opened, message);
    assert_eq!(opened.to_vec().unwrap(), message.to_vec().unwrap());
}

#[tokio::test]
async fn signed_layout_keeps_field_order() {
    let (envelope, verkey) = envelope().await;
    let message = Message::from_value(json!({
        "@type": "T",
        "@id": "1",
        "before": 1,
        "content": "payload",
        "after": [1, 2],
    }))
    .unwrap();

    let signed = envelope.sign(&message, "content", verkey.as_str()).await.unwrap();
    let keys: Vec<&str> = signed.keys().collect();
    assert_eq!(keys, ["@type", "@id", "before", "content~sig", "after"]);

    let opened = envelope.verify(&signed, "content").await.unwrap();
    let keys: Vec<&str> = opened.keys().collect();
    assert_eq!(keys, ["@type", "@id", "before", "content", "after"]);
    assert_eq!(opened.to_vec().unwrap(), message.to_vec().unwrap());
}

#[tokio::test]
async fn flipped_signature_bit_rejected() {
    let (envelope, verkey) = envelope().await;
    let signed = envelope
        .sign(&content_message(), "content", verkey.as_str())
        .await
        .unwrap();

    let mut wire = signed.into_value();
    let mut sig = b64_decode(wire["content~sig"]["signature"].as_str().unwrap());
    sig[0] ^= 0x01;
    wire["content~sig"]["signature"] = json!(b64(&sig));
    let tampered = Message::from_value(wire).unwrap();

    let err = envelope.verify(&tampered, "content").await.unwrap_err();
    assert!(
        matches!(err, WalletError::SignatureInvalid { ref field } if field == "content"),
        "{err:?}"
    );
}

#[tokio::test]
async fn replaced_sig_data_rejected() {
    let (envelope, verkey) = envelope().await;
    let signed = envelope
        .sign(&content_message(), "content", verkey.as_str())
        .await
        .unwrap();

    let mut wire = signed.into_value();
    wire["content~sig"]["sig_data"] = json!(b64(br#"{"x":2}"#));
    let tampered = Message::from_value(wire).unwrap();

    let err = envelope.verify(&tampered, "content").await.unwrap_err();
    assert!(matches!(err, WalletError::SignatureInvalid { .. }), "{err:?}");
}

#[tokio::test]
async fn other_signer_rejected() {
    let store = Arc::new(KeyStore::new());
    let alice = store.create_key(None).await;
    let bob = store.create_key(None).await;
    let envelope = SignatureEnvelope::new(store);

    let signed = envelope
        .sign(&content_message(), "content", alice.as_str())
        .await
        .unwrap();
    let mut wire = signed.into_value();
    wire["content~sig"]["signers"] = json!(bob.as_str());
    let forged = Message::from_value(wire).unwrap();

    let err = envelope.verify(&forged, "content").await.unwrap_err();
    assert!(matches!(err, WalletError::SignatureInvalid { .. }), "{err:?}");
}

#[tokio::test]
async fn verification_needs_no_private_key() {
    let (signer, verkey) = envelope().await;
    let signed = signer
        .sign(&content_message(), "content", verkey.as_str())
        .await
        .unwrap();

    let verifier = SignatureEnvelope::new(Arc::new(KeyStore::new()));
    let opened = verifier.verify(&signed, "content").await.unwrap();
    assert_eq!(opened, content_message());
}

#[tokio::test]
async fn missing_field_and_missing_block() {
    let (envelope, verkey) = envelope().await;
    let message = content_message();

    let err = envelope.sign(&message, "absent", verkey.as_str()).await.unwrap_err();
    assert!(matches!(err, WalletError::InvalidMessage(_)), "{err:?}");

    let err = envelope.verify(&message, "content").await.unwrap_err();
    assert!(matches!(err, WalletError::InvalidMessage(_)), "{err:?}");
}

#[tokio::test]
async fn unknown_signer_is_crypto_error() {
    let (envelope, _) = envelope().await;
    let err = envelope
        .sign(&content_message(), "content", "NotAKeyInTheStore")
        .await
        .unwrap_err();
    assert!(matches!(err, WalletError::Crypto { .. }), "{err:?}");
}

// ── Substituted crypto backend ────────────────────────────────────────────────

/// Signs with a constant and reports every signature as valid or invalid.
struct FixedCrypto {
    accept: bool,
}

#[async_trait]
impl CryptoBackend for FixedCrypto {
    async fn sign(&self, _key_ref: &str, _data: &[u8]) -> BackendResult<Vec<u8>> {
        Ok(vec![7; 4])
    }

    async fn verify(&self, _key_ref: &str, _data: &[u8], _signature: &[u8]) -> BackendResult<bool> {
        Ok(self.accept)
    }
}

/// Fails every call.
struct FailingCrypto;

#[async_trait]
impl CryptoBackend for FailingCrypto {
    async fn sign(&self, _key_ref: &str, _data: &[u8]) -> BackendResult<Vec<u8>> {
        Err(BackendError::other("hsm offline"))
    }

    async fn verify(&self, _key_ref: &str, _data: &[u8], _signature: &[u8]) -> BackendResult<bool> {
        Err(BackendError::verification_failed("bad signature"))
    }
}

#[tokio::test]
async fn substituted_backend_drives_outcome() {
    let accepting = SignatureEnvelope::new(Arc::new(FixedCrypto { accept: true }));
    let signed = accepting.sign(&content_message(), "content", "k").await.unwrap();
    assert_eq!(signed.get("content~sig").unwrap()["signature"], b64(&[7; 4]));
    assert_eq!(accepting.verify(&signed, "content").await.unwrap(), content_message());

    let rejecting = SignatureEnvelope::new(Arc::new(FixedCrypto { accept: false }));
    let err = rejecting.verify(&signed, "content").await.unwrap_err();
    assert!(matches!(err, WalletError::SignatureInvalid { .. }));
}

#[tokio::test]
async fn backend_failures_are_classified() {
    let accepting = SignatureEnvelope::new(Arc::new(FixedCrypto { accept: true }));
    let signed = accepting.sign(&content_message(), "content", "k").await.unwrap();

    let failing = SignatureEnvelope::new(Arc::new(FailingCrypto));

    let err = failing.sign(&content_message(), "content", "k").await.unwrap_err();
    match err {
        WalletError::Crypto { source, .. } => assert_eq!(source.message(), "hsm offline"),
        other => panic!("expected Crypto, got {other:?}"),
    }

    let err = failing.verify(&signed, "content").await.unwrap_err();
    assert!(matches!(err, WalletError::SignatureInvalid { .. }), "{err:?}");
}

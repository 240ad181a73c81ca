//! Detached signatures over one message field.
//!
//! Signing replaces `field` with a signature block stored at
//! `<field>~sig`; verifying does the reverse:
//!
//! ```json
//! {
//!     "@type": "...",
//!     "@id": "...",
//!     "content~sig": {
//!         "@type": "did:sov:BzCbsNYhMrjHiqZDTUASHg;spec/signature/1.0/ed25519Sha512_single",
//!         "signature": "<base64 signature>",
//!         "sig_data": "<base64 JSON of the original field value>",
//!         "signers": "<signer verkey>"
//!     }
//! }
//! ```
//!
//! The block takes the position the field had, and the field comes back to
//! the position of the block, so `verify(sign(m))` reproduces `m` byte for
//! byte. `sig_data` is the compact JSON of the field value and nothing
//! else; there is no timestamp or nonce.

use std::sync::Arc;

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::Message;
use crate::backend::CryptoBackend;
use crate::error::{map_crypto_error, Result, WalletError};

/// Signature type emitted in every block. Part of the wire protocol.
pub const SIG_SPEC_CONST: &str =
    "did:sov:BzCbsNYhMrjHiqZDTUASHg;spec/signature/1.0/ed25519Sha512_single";

const SIG_SUFFIX: &str = "~sig";

/// Key under which the signature block for `field` is stored.
pub fn signature_key(field: &str) -> String {
    format!("{field}{SIG_SUFFIX}")
}

/// The `<field>~sig` block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureDecorator {
    #[serde(rename = "@type")]
    pub sig_type: String,
    /// Base64 signature bytes.
    pub signature: String,
    /// Base64 of the signed bytes.
    pub sig_data: String,
    /// Key reference of the signer.
    pub signers: String,
}

impl SignatureDecorator {
    pub fn signature_bytes(&self) -> Result<Vec<u8>> {
        decode_base64(&self.signature, "signature")
    }

    pub fn sig_data_bytes(&self) -> Result<Vec<u8>> {
        decode_base64(&self.sig_data, "sig_data")
    }
}

fn encode_base64(bytes: &[u8]) -> String {
    base64::Engine::encode(&base64::engine::general_purpose::STANDARD, bytes)
}

fn decode_base64(text: &str, what: &str) -> Result<Vec<u8>> {
    base64::Engine::decode(&base64::engine::general_purpose::STANDARD, text)
        .map_err(|e| WalletError::InvalidMessage(format!("invalid {what} base64: {e}")))
}

/// Signs and verifies message fields through a [`CryptoBackend`].
///
/// Holds no state besides the backend handle; calls are independent.
#[derive(Clone)]
pub struct SignatureEnvelope {
    crypto: Arc<dyn CryptoBackend>,
}

impl SignatureEnvelope {
    pub fn new(crypto: Arc<dyn CryptoBackend>) -> Self {
        Self { crypto }
    }

    /// Replace `field` with a signature block made by `signer`.
    ///
    /// # Errors
    ///
    /// `WalletError::InvalidMessage` if `field` is absent, reserved, or
    /// already signed; `WalletError::Crypto` if the backend cannot sign.
    pub async fn sign(&self, message: &Message, field: &str, signer: &str) -> Result<Message> {
        let sig_key = signature_key(field);
        let data = message.get(field).ok_or_else(|| {
            WalletError::InvalidMessage(format!("field '{field}' not present in {}", message.id()))
        })?;
        if message.contains_key(&sig_key) {
            return Err(WalletError::InvalidMessage(format!(
                "'{field}' is already signed in {}",
                message.id()
            )));
        }

        let data_bytes =
            serde_json::to_vec(data).map_err(|e| WalletError::SerializationError(e.to_string()))?;

        debug!("sign {} field '{field}' with {signer}", message.id());
        let signature = self
            .crypto
            .sign(signer, &data_bytes)
            .await
            .map_err(|e| map_crypto_error(e, field))?;

        let block = SignatureDecorator {
            sig_type: SIG_SPEC_CONST.to_string(),
            signature: encode_base64(&signature),
            sig_data: encode_base64(&data_bytes),
            signers: signer.to_string(),
        };
        let block =
            serde_json::to_value(block).map_err(|e| WalletError::SerializationError(e.to_string()))?;

        let mut signed = message.clone();
        signed.replace_key(field, sig_key, block)?;
        Ok(signed)
    }

    /// Check the `<field>~sig` block and restore `field` from it.
    ///
    /// # Errors
    ///
    /// `WalletError::SignatureInvalid` if the signature does not verify,
    /// `WalletError::InvalidMessage` if the block is absent or malformed,
    /// `WalletError::Crypto` if the backend cannot verify at all.
    pub async fn verify(&self, message: &Message, field: &str) -> Result<Message> {
        let sig_key = signature_key(field);
        let block_value = message.get(&sig_key).ok_or_else(|| {
            WalletError::InvalidMessage(format!("'{sig_key}' not present in {}", message.id()))
        })?;
        if message.contains_key(field) {
            return Err(WalletError::InvalidMessage(format!(
                "both '{field}' and '{sig_key}' present in {}",
                message.id()
            )));
        }

        let block: SignatureDecorator = serde_json::from_value(block_value.clone())
            .map_err(|e| WalletError::InvalidMessage(format!("malformed '{sig_key}': {e}")))?;
        if block.sig_type != SIG_SPEC_CONST {
            debug!("'{sig_key}' has signature type {}", block.sig_type);
        }

        let sig_data = block.sig_data_bytes()?;
        let signature = block.signature_bytes()?;

        let valid = self
            .crypto
            .verify(&block.signers, &sig_data, &signature)
            .await
            .map_err(|e| map_crypto_error(e, field))?;
        if !valid {
            warn!(
                "rejected signature on {} field '{field}' by {}",
                message.id(),
                block.signers
            );
            return Err(WalletError::SignatureInvalid {
                field: field.to_string(),
            });
        }

        let data: Value = serde_json::from_slice(&sig_data)
            .map_err(|e| WalletError::InvalidMessage(format!("sig_data is not JSON: {e}")))?;

        let mut opened = message.clone();
        opened.replace_key(&sig_key, field, data)?;
        Ok(opened)
    }
}

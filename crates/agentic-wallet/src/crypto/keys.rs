//! Ed25519 key pairs and verkeys.
//!
//! A verkey is the base58 encoding of a 32-byte Ed25519 public key. It is
//! the key reference that crosses the wallet boundary; signing keys never
//! leave the key store.

use ed25519_dalek::{SigningKey, VerifyingKey};
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use crate::backend::{BackendError, BackendResult};

/// Length in bytes of a key seed.
pub const SEED_LEN: usize = 32;

/// Base58-encoded Ed25519 public key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Verkey(pub String);

impl Verkey {
    pub fn from_verifying_key(key: &VerifyingKey) -> Self {
        Self(bs58::encode(key.as_bytes()).into_string())
    }

    /// Parse back into a verifying key.
    pub fn to_verifying_key(&self) -> BackendResult<VerifyingKey> {
        verifying_key_from_verkey(&self.0)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Verkey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Decode a base58 verkey into an Ed25519 verifying key.
pub fn verifying_key_from_verkey(verkey: &str) -> BackendResult<VerifyingKey> {
    let bytes = bs58::decode(verkey)
        .into_vec()
        .map_err(|e| BackendError::invalid_key(format!("invalid verkey base58: {e}")))?;
    let array: [u8; 32] = bytes
        .try_into()
        .map_err(|_| BackendError::invalid_key("verkey must decode to 32 bytes"))?;
    VerifyingKey::from_bytes(&array)
        .map_err(|e| BackendError::invalid_key(format!("invalid verkey: {e}")))
}

/// Unqualified DID for a verkey: base58 of its first 16 bytes.
pub fn did_from_verkey(verkey: &str) -> BackendResult<String> {
    let key = verifying_key_from_verkey(verkey)?;
    Ok(bs58::encode(&key.as_bytes()[..16]).into_string())
}

/// An Ed25519 key pair held by the key store.
///
/// `SigningKey` zeroizes itself on drop.
pub struct Ed25519KeyPair {
    signing_key: SigningKey,
    verifying_key: VerifyingKey,
}

impl Ed25519KeyPair {
    /// Generate a new random key pair.
    pub fn generate() -> Self {
        Self::from_signing_key(SigningKey::generate(&mut rand::thread_rng()))
    }

    /// Derive a key pair deterministically from a 32-byte seed.
    pub fn from_seed(seed: &[u8; SEED_LEN]) -> Self {
        Self::from_signing_key(SigningKey::from_bytes(seed))
    }

    /// Derive a key pair from a seed given as text.
    ///
    /// The text must be exactly 32 bytes long; its bytes are the seed.
    pub fn from_seed_str(seed: &str) -> BackendResult<Self> {
        let mut array: [u8; SEED_LEN] = seed.as_bytes().try_into().map_err(|_| {
            BackendError::invalid_key(format!("seed must be {SEED_LEN} bytes, got {}", seed.len()))
        })?;
        let pair = Self::from_seed(&array);
        array.zeroize();
        Ok(pair)
    }

    fn from_signing_key(signing_key: SigningKey) -> Self {
        let verifying_key = signing_key.verifying_key();
        Self {
            signing_key,
            verifying_key,
        }
    }

    pub fn signing_key(&self) -> &SigningKey {
        &self.signing_key
    }

    pub fn verifying_key(&self) -> &VerifyingKey {
        &self.verifying_key
    }

    pub fn verkey(&self) -> Verkey {
        Verkey::from_verifying_key(&self.verifying_key)
    }
}

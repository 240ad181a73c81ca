//! In-process key store implementing [`CryptoBackend`].
//!
//! Keys are created inside the store and addressed by verkey from then on.
//! Signing keys are never handed out.

use std::collections::HashMap;

use async_trait::async_trait;
use log::debug;
use tokio::sync::RwLock;

use super::keys::{Ed25519KeyPair, Verkey, SEED_LEN};
use super::signing;
use crate::backend::{BackendError, BackendResult, CryptoBackend};

/// Ed25519 key store keyed by verkey.
#[derive(Default)]
pub struct KeyStore {
    keys: RwLock<HashMap<String, Ed25519KeyPair>>,
}

impl KeyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a key and return its verkey.
    ///
    /// With a seed the key is deterministic; creating it twice yields the
    /// same verkey and keeps a single entry.
    pub async fn create_key(&self, seed: Option<&[u8; SEED_LEN]>) -> Verkey {
        let pair = match seed {
            Some(seed) => Ed25519KeyPair::from_seed(seed),
            None => Ed25519KeyPair::generate(),
        };
        self.insert(pair).await
    }

    /// Create a key from a 32-byte text seed.
    pub async fn create_key_from_seed_str(&self, seed: &str) -> BackendResult<Verkey> {
        let pair = Ed25519KeyPair::from_seed_str(seed)?;
        Ok(self.insert(pair).await)
    }

    async fn insert(&self, pair: Ed25519KeyPair) -> Verkey {
        let verkey = pair.verkey();
        debug!("key store: created {verkey}");
        self.keys.write().await.insert(verkey.0.clone(), pair);
        verkey
    }

    pub async fn contains(&self, verkey: &str) -> bool {
        self.keys.read().await.contains_key(verkey)
    }

    /// Verkeys of all stored keys, in no particular order.
    pub async fn verkeys(&self) -> Vec<Verkey> {
        self.keys
            .read()
            .await
            .keys()
            .map(|k| Verkey(k.clone()))
            .collect()
    }
}

#[async_trait]
impl CryptoBackend for KeyStore {
    async fn sign(&self, key_ref: &str, data: &[u8]) -> BackendResult<Vec<u8>> {
        let keys = self.keys.read().await;
        let pair = keys
            .get(key_ref)
            .ok_or_else(|| BackendError::not_found(format!("no signing key for verkey {key_ref}")))?;
        Ok(signing::sign(pair.signing_key(), data))
    }

    async fn verify(&self, key_ref: &str, data: &[u8], signature: &[u8]) -> BackendResult<bool> {
        signing::verify(key_ref, data, signature)
    }
}

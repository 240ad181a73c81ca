//! Cryptographic primitives for AgenticWallet.
//!
//! This module provides:
//! - Ed25519 key pairs, verkeys and DIDs derived from them
//! - Detached signing and verification
//! - [`KeyStore`], an in-process [`CryptoBackend`](crate::backend::CryptoBackend)

pub mod keys;
pub mod keystore;
pub mod signing;

pub use keys::{did_from_verkey, Ed25519KeyPair, Verkey};
pub use keystore::KeyStore;

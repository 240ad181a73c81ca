//! Ed25519 detached signing and verification over verkeys.

use ed25519_dalek::{Signature, Signer, SigningKey, Verifier};

use super::keys::verifying_key_from_verkey;
use crate::backend::BackendResult;

/// Sign `message`, returning the 64 signature bytes.
pub fn sign(signing_key: &SigningKey, message: &[u8]) -> Vec<u8> {
    signing_key.sign(message).to_bytes().to_vec()
}

/// Verify `signature` over `message` against `verkey`.
///
/// Returns `Ok(false)` for any signature that does not verify, including
/// ones of the wrong length. Fails only when `verkey` itself is unusable.
pub fn verify(verkey: &str, message: &[u8], signature: &[u8]) -> BackendResult<bool> {
    let verifying_key = verifying_key_from_verkey(verkey)?;

    let Ok(sig_array) = <[u8; 64]>::try_from(signature) else {
        return Ok(false);
    };
    let signature = Signature::from_bytes(&sig_array);

    Ok(verifying_key.verify(message, &signature).is_ok())
}

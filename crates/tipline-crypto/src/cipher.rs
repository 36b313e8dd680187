//! AES-256-GCM field encryption
//!
//! Every sensitive field is sealed under a tenant key with a fresh random
//! 96-bit IV and a detached 16-byte tag. Optional AAD binds a ciphertext to
//! its semantic slot (e.g. "this is the contact field of case X"), so a valid
//! ciphertext cannot be replayed into a different field even when the storage
//! layout is predictable.
//!
//! Decryption is all-or-nothing: the tag is verified before any plaintext is
//! released, and a 1-bit corruption anywhere in iv/tag/ciphertext/aad fails
//! the whole operation.

use aes_gcm::{
    aead::{Aead, KeyInit, Payload},
    Aes256Gcm, Nonce,
};
use rand::RngCore;

use tipline_core::{EncryptedPayload, TiplineError, TiplineResult, IV_SIZE, TAG_SIZE};

use crate::kdf::TenantKey;

/// Encrypt a field under a tenant key.
///
/// A fresh random IV is drawn on every call; IVs are never reused under the
/// same key. The payload records the key version so it stays decryptable
/// after the tenant rotates.
pub fn encrypt(
    key: &TenantKey,
    plaintext: &[u8],
    aad: Option<&[u8]>,
) -> TiplineResult<EncryptedPayload> {
    let cipher = Aes256Gcm::new(key.as_bytes().into());

    let mut iv = [0u8; IV_SIZE];
    rand::thread_rng().fill_bytes(&mut iv);
    let nonce = Nonce::from_slice(&iv);

    let mut sealed = cipher
        .encrypt(
            nonce,
            Payload {
                msg: plaintext,
                aad: aad.unwrap_or(&[]),
            },
        )
        .map_err(|e| TiplineError::Crypto(format!("field encryption failed: {e}")))?;

    // aes-gcm appends the tag; detach it so the stored shape is explicit
    let tag_at = sealed.len() - TAG_SIZE;
    let tag_bytes = sealed.split_off(tag_at);
    let mut tag = [0u8; TAG_SIZE];
    tag.copy_from_slice(&tag_bytes);

    Ok(EncryptedPayload {
        version: key.version(),
        iv,
        tag,
        ciphertext: sealed,
        aad: aad.map(|a| a.to_vec()),
    })
}

/// Decrypt a field under a tenant key.
///
/// `aad` must be byte-identical to what was supplied at encryption time (or
/// `None` if none was). Any mismatch, corruption, or wrong key yields
/// [`TiplineError::Integrity`] and no plaintext.
pub fn decrypt(
    key: &TenantKey,
    payload: &EncryptedPayload,
    aad: Option<&[u8]>,
) -> TiplineResult<Vec<u8>> {
    let cipher = Aes256Gcm::new(key.as_bytes().into());
    let nonce = Nonce::from_slice(&payload.iv);

    let mut sealed = Vec::with_capacity(payload.ciphertext.len() + TAG_SIZE);
    sealed.extend_from_slice(&payload.ciphertext);
    sealed.extend_from_slice(&payload.tag);

    cipher
        .decrypt(
            nonce,
            Payload {
                msg: &sealed,
                aad: aad.unwrap_or(&[]),
            },
        )
        .map_err(|_| TiplineError::Integrity)
}

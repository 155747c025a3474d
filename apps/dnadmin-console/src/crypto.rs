//! Sealing of the seed phrase into an opaque encrypted payload.
//!
//! The payload format is owned by this module end to end: a 32-byte key
//! derived from the local admin secret and the dappmanager's published
//! encryption key, AES-256-GCM with a random 12-byte nonce, and the
//! base64-encoded `nonce || ciphertext` as the submitted string.

use aes_gcm::aead::Aead;
use aes_gcm::{Aes256Gcm, KeyInit, Nonce};
use anyhow::anyhow;
use base64::Engine as _;
use rand::RngCore as _;
use sha2::{Digest as _, Sha256};

const NONCE_LEN: usize = 12;

pub fn seal(
    plaintext: &str,
    local_secret: &str,
    remote_public_key: &str,
) -> anyhow::Result<String> {
    let key = shared_key(local_secret, remote_public_key);
    let cipher =
        Aes256Gcm::new_from_slice(&key).map_err(|e| anyhow!("derive sealing key: {e}"))?;
    let mut nonce = [0u8; NONCE_LEN];
    rand::rng().fill_bytes(&mut nonce);
    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce), plaintext.as_bytes())
        .map_err(|e| anyhow!("seal failed: {e}"))?;
    let mut payload = Vec::with_capacity(NONCE_LEN + ciphertext.len());
    payload.extend_from_slice(&nonce);
    payload.extend_from_slice(&ciphertext);
    Ok(base64::engine::general_purpose::STANDARD.encode(payload))
}

fn shared_key(local_secret: &str, remote_public_key: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(local_secret.as_bytes());
    hasher.update(remote_public_key.as_bytes());
    hasher.finalize().into()
}

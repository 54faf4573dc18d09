//! Hybrid cipher: AES-256-GCM for the payload, RSA-OAEP(SHA-256) for the
//! session key material
//!
//! Encrypted payload layout (binary): `[N bytes: ciphertext][16 bytes: tag]`
//!
//! Asymmetric failures surface as the cause-free `DecryptionFailed`; a
//! distinguishable error per failure mode would hand an attacker a
//! padding-oracle probe.

use aes_gcm::{aead::Aead, Aes256Gcm, KeyInit, Nonce};
use rsa::{Oaep, RsaPrivateKey, RsaPublicKey};
use sha2::Sha256;
use zeroize::Zeroize;

use sdx_core::{SdxError, SdxResult};

use crate::keys::{generate_session_key, SessionKey};
use crate::{IV_SIZE, KEY_SIZE};

/// Ciphertext plus trailing GCM authentication tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedPayload {
    bytes: Vec<u8>,
}

impl EncryptedPayload {
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// Session key material encrypted under the recipient's public key. The
/// key and nonce are two independent OAEP ciphertexts.
pub struct WrappedSessionKey {
    pub encrypted_key: Vec<u8>,
    pub encrypted_iv: Vec<u8>,
}

fn oaep() -> Oaep {
    Oaep::new::<Sha256>()
}

/// Decrypt a short inbound token (an access credential) directly under
/// the recipient's private key.
pub fn unwrap_token(encrypted_token: &[u8], token_private_key: &RsaPrivateKey) -> SdxResult<Vec<u8>> {
    token_private_key
        .decrypt(oaep(), encrypted_token)
        .map_err(|_| SdxError::DecryptionFailed)
}

/// Authenticated-encrypt `plaintext` under a freshly generated session
/// key. Returns the ciphertext and the key so the caller can wrap it for
/// the recipient.
pub fn encrypt_payload(plaintext: &[u8]) -> SdxResult<(EncryptedPayload, SessionKey)> {
    let session = generate_session_key();

    let cipher = Aes256Gcm::new_from_slice(session.key())
        .map_err(|e| SdxError::Internal(format!("AES-256-GCM key: {e}")))?;
    let nonce = Nonce::from_slice(session.iv());

    let ciphertext = cipher
        .encrypt(nonce, plaintext)
        .map_err(|e| SdxError::Internal(format!("payload encryption: {e}")))?;

    Ok((EncryptedPayload::from_bytes(ciphertext), session))
}

/// Wrap the session key and nonce under the recipient's public key as two
/// separate, minimally-sized OAEP operations. Bundling them into one
/// ciphertext would crowd the OAEP plaintext ceiling.
pub fn wrap_session_key(
    session: &SessionKey,
    recipient_public_key: &RsaPublicKey,
) -> SdxResult<WrappedSessionKey> {
    let mut rng = rand::thread_rng();

    let encrypted_key = recipient_public_key
        .encrypt(&mut rng, oaep(), session.key())
        .map_err(|e| SdxError::Internal(format!("key wrap: {e}")))?;
    let encrypted_iv = recipient_public_key
        .encrypt(&mut rng, oaep(), session.iv())
        .map_err(|e| SdxError::Internal(format!("nonce wrap: {e}")))?;

    Ok(WrappedSessionKey {
        encrypted_key,
        encrypted_iv,
    })
}

/// Recover a session key wrapped by `wrap_session_key`.
pub fn unwrap_session_key(
    encrypted_key: &[u8],
    encrypted_iv: &[u8],
    recipient_private_key: &RsaPrivateKey,
) -> SdxResult<SessionKey> {
    let mut key_bytes = recipient_private_key
        .decrypt(oaep(), encrypted_key)
        .map_err(|_| SdxError::DecryptionFailed)?;
    let mut iv_bytes = recipient_private_key
        .decrypt(oaep(), encrypted_iv)
        .map_err(|_| {
            key_bytes.zeroize();
            SdxError::DecryptionFailed
        })?;

    if key_bytes.len() != KEY_SIZE || iv_bytes.len() != IV_SIZE {
        let (key_len, iv_len) = (key_bytes.len(), iv_bytes.len());
        key_bytes.zeroize();
        iv_bytes.zeroize();
        return Err(SdxError::InvalidKeyMaterial(format!(
            "unwrapped session key has wrong size: key {key_len} bytes, nonce {iv_len} bytes"
        )));
    }

    let mut key = [0u8; KEY_SIZE];
    let mut iv = [0u8; IV_SIZE];
    key.copy_from_slice(&key_bytes);
    iv.copy_from_slice(&iv_bytes);
    key_bytes.zeroize();
    iv_bytes.zeroize();

    Ok(SessionKey::from_parts(key, iv))
}

/// Authenticated-decrypt a payload. The GCM tag is verified before any
/// plaintext is released; a mismatch yields `AuthenticationFailed` and no
/// partial output.
pub fn decrypt_payload(payload: &EncryptedPayload, session: &SessionKey) -> SdxResult<Vec<u8>> {
    let cipher = Aes256Gcm::new_from_slice(session.key())
        .map_err(|e| SdxError::InvalidKeyMaterial(format!("AES-256-GCM key: {e}")))?;
    let nonce = Nonce::from_slice(session.iv());

    cipher
        .decrypt(nonce, payload.as_bytes())
        .map_err(|_| SdxError::AuthenticationFailed)
}

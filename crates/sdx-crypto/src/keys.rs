//! Key material: RSA key pairs in interchange encodings, per-transfer
//! symmetric session keys

use rand::RngCore;
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey};
use rsa::{RsaPrivateKey, RsaPublicKey};
use zeroize::Zeroize;

use sdx_core::{SdxError, SdxResult};

use crate::{IV_SIZE, KEY_SIZE, RSA_MODULUS_BITS};

/// An RSA-OAEP key pair. Two independent pairs exist per deployment: the
/// token pair (decrypts inbound access tokens) and the data pair (wraps
/// outbound session keys).
pub struct KeyPair {
    pub public: RsaPublicKey,
    pub private: RsaPrivateKey,
}

/// A fresh-per-transfer symmetric key and nonce. Never reused across
/// payloads; zeroized on drop.
#[derive(Clone)]
pub struct SessionKey {
    key: [u8; KEY_SIZE],
    iv: [u8; IV_SIZE],
}

impl SessionKey {
    pub fn from_parts(key: [u8; KEY_SIZE], iv: [u8; IV_SIZE]) -> Self {
        Self { key, iv }
    }

    pub fn key(&self) -> &[u8; KEY_SIZE] {
        &self.key
    }

    pub fn iv(&self) -> &[u8; IV_SIZE] {
        &self.iv
    }
}

impl Drop for SessionKey {
    fn drop(&mut self) {
        self.key.zeroize();
        self.iv.zeroize();
    }
}

impl std::fmt::Debug for SessionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionKey")
            .field("key", &"[REDACTED]")
            .field("iv", &"[REDACTED]")
            .finish()
    }
}

/// Generate a 4096-bit RSA-OAEP key pair usable for both the encryption
/// and decryption roles.
pub fn generate_keypair() -> SdxResult<KeyPair> {
    let private = RsaPrivateKey::new(&mut rand::thread_rng(), RSA_MODULUS_BITS)
        .map_err(|e| SdxError::InvalidKeyMaterial(format!("key generation: {e}")))?;
    let public = RsaPublicKey::from(&private);
    Ok(KeyPair { public, private })
}

/// Export the public half as SubjectPublicKeyInfo DER.
pub fn export_public(pair: &KeyPair) -> SdxResult<Vec<u8>> {
    let der = pair
        .public
        .to_public_key_der()
        .map_err(|e| SdxError::InvalidKeyMaterial(format!("SPKI export: {e}")))?;
    Ok(der.as_bytes().to_vec())
}

/// Export the private half as PKCS#8 DER.
pub fn export_private(pair: &KeyPair) -> SdxResult<Vec<u8>> {
    let der = pair
        .private
        .to_pkcs8_der()
        .map_err(|e| SdxError::InvalidKeyMaterial(format!("PKCS#8 export: {e}")))?;
    Ok(der.as_bytes().to_vec())
}

/// Import a public key from SubjectPublicKeyInfo DER.
pub fn import_public(der: &[u8]) -> SdxResult<RsaPublicKey> {
    RsaPublicKey::from_public_key_der(der)
        .map_err(|e| SdxError::InvalidKeyMaterial(format!("SPKI import: {e}")))
}

/// Import a private key from PKCS#8 DER.
pub fn import_private(der: &[u8]) -> SdxResult<RsaPrivateKey> {
    RsaPrivateKey::from_pkcs8_der(der)
        .map_err(|e| SdxError::InvalidKeyMaterial(format!("PKCS#8 import: {e}")))
}

/// Generate a fresh symmetric session key and nonce from the OS CSPRNG.
pub fn generate_session_key() -> SessionKey {
    let mut key = [0u8; KEY_SIZE];
    let mut iv = [0u8; IV_SIZE];
    rand::thread_rng().fill_bytes(&mut key);
    rand::thread_rng().fill_bytes(&mut iv);
    SessionKey::from_parts(key, iv)
}

#[cfg(test)]
pub(crate) mod test_keys {
    use super::*;
    use std::sync::OnceLock;

    // 4096-bit keygen is expensive; share one pair of pairs per test binary
    static PAIR_A: OnceLock<KeyPair> = OnceLock::new();
    static PAIR_B: OnceLock<KeyPair> = OnceLock::new();

    pub fn pair_a() -> &'static KeyPair {
        PAIR_A.get_or_init(|| generate_keypair().unwrap())
    }

    pub fn pair_b() -> &'static KeyPair {
        PAIR_B.get_or_init(|| generate_keypair().unwrap())
    }
}

#[cfg(test)]
mod tests {
    use super::test_keys::{pair_a, pair_b};
    use super::*;

    #[test]
    fn session_keys_are_unique() {
        let a = generate_session_key();
        let b = generate_session_key();
        assert_ne!(a.key(), b.key(), "random keys must differ");
        assert_ne!(a.iv(), b.iv(), "random nonces must differ");
    }

    #[test]
    fn session_key_debug_is_redacted() {
        let key = generate_session_key();
        let printed = format!("{key:?}");
        assert!(printed.contains("REDACTED"));
    }

    #[test]
    fn public_key_roundtrips_through_spki() {
        let pair = pair_a();
        let der = export_public(pair).unwrap();
        let imported = import_public(&der).unwrap();
        assert_eq!(imported, pair.public);
    }

    #[test]
    fn private_key_roundtrips_through_pkcs8() {
        let pair = pair_a();
        let der = export_private(pair).unwrap();
        let imported = import_private(&der).unwrap();
        assert_eq!(imported, pair.private);
    }

    #[test]
    fn import_rejects_garbage() {
        assert!(matches!(
            import_public(b"not a key").unwrap_err(),
            SdxError::InvalidKeyMaterial(_)
        ));
        assert!(matches!(
            import_private(b"not a key").unwrap_err(),
            SdxError::InvalidKeyMaterial(_)
        ));
    }

    #[test]
    fn import_rejects_wrong_role_encoding() {
        // a public SPKI blob is not a PKCS#8 private key
        let der = export_public(pair_b()).unwrap();
        assert!(matches!(
            import_private(&der).unwrap_err(),
            SdxError::InvalidKeyMaterial(_)
        ));
    }
}

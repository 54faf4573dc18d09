//! sdx-crypto: hybrid encryption for the secure data exchange pipeline
//!
//! Pattern: asymmetric-wraps-symmetric.
//!
//! ```text
//! payload  ──AES-256-GCM──▶ ciphertext‖tag          (bulk data, chunked later)
//! session key + nonce ──RSA-OAEP(SHA-256)──▶ wrapped key material
//! ```
//!
//! The session key and nonce are always wrapped in full before any
//! chunking happens; only the bulk ciphertext is ever split. Wrapping the
//! key and the nonce are two independent OAEP operations so each plaintext
//! stays far below the OAEP size ceiling for the fixed 4096-bit modulus.

pub mod hybrid;
pub mod keys;

pub use hybrid::{
    decrypt_payload, encrypt_payload, unwrap_session_key, unwrap_token, wrap_session_key,
    EncryptedPayload, WrappedSessionKey,
};
pub use keys::{
    export_private, export_public, generate_keypair, generate_session_key, import_private,
    import_public, KeyPair, SessionKey,
};

// Key types cross crate boundaries as opaque handles
pub use rsa::{RsaPrivateKey, RsaPublicKey};

/// Symmetric session key size in bytes (256-bit)
pub const KEY_SIZE: usize = 32;

/// AES-GCM nonce size in bytes (96-bit)
pub const IV_SIZE: usize = 12;

/// GCM authentication tag size in bytes
pub const TAG_SIZE: usize = 16;

/// RSA modulus size in bits. Fixed, not configurable: wrapping overhead
/// and the OAEP plaintext ceiling are sized against it.
pub const RSA_MODULUS_BITS: usize = 4096;

//! Provide/consume orchestration
//!
//! One `Pipeline` per store; each call is one independent transfer with no
//! shared mutable state beyond the read-only configuration, so concurrent
//! transfers never interfere. Chunks orphaned by a cancelled or failed
//! transfer are left to the store's garbage collection — the pipeline
//! never rolls back against the store.

use tracing::{debug, info};

use sdx_codec::{decode_base64, encode_base64, join_chunks, split_into_chunks};
use sdx_core::{SdxError, SdxResult};
use sdx_crypto::{
    decrypt_payload, encrypt_payload, import_public, unwrap_session_key, unwrap_token,
    wrap_session_key, EncryptedPayload, RsaPrivateKey,
};
use sdx_store::{fetch_chunks_ordered, upload_chunks_ordered, ContentStore};

use crate::manifest::WrappedKeyManifest;
use crate::upstream::UpstreamApi;

/// The two request arguments of a provide run, as handed over by the
/// external request/response substrate.
pub struct ProvideRequest {
    /// Base64 of the access token, OAEP-encrypted under the token public key
    pub encrypted_token: String,
    /// Base64 SPKI of the recipient's data public key
    pub data_public_key: String,
}

#[derive(Debug)]
pub struct Pipeline<S> {
    store: S,
    chunk_size: usize,
}

impl<S: ContentStore> Pipeline<S> {
    pub fn new(store: S, chunk_size: usize) -> SdxResult<Self> {
        if chunk_size == 0 {
            return Err(SdxError::InvalidChunkSize(0));
        }
        Ok(Self { store, chunk_size })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Producer direction. Returns the manifest address, the single
    /// handle a consumer needs.
    ///
    /// Token unwrap and the upstream fetch run before anything touches
    /// the store, so a failed run never leaves a partial manifest behind.
    pub async fn provide(
        &self,
        upstream: &impl UpstreamApi,
        token_private_key: &RsaPrivateKey,
        request: &ProvideRequest,
    ) -> SdxResult<String> {
        let encrypted_token = decode_base64(&request.encrypted_token)?;
        let token = unwrap_token(&encrypted_token, token_private_key)?;
        let token = String::from_utf8(token)
            .map_err(|_| SdxError::MalformedEncoding("access token is not UTF-8".into()))?;

        let data_public_key = import_public(&decode_base64(&request.data_public_key)?)?;

        let payload = upstream.fetch(&token).await?;
        info!(bytes = payload.len(), "fetched upstream payload");

        let (encrypted, session) = encrypt_payload(&payload)?;
        // wrap-then-split: key material is wrapped in full before chunking
        let wrapped = wrap_session_key(&session, &data_public_key)?;
        drop(session);

        let chunks = split_into_chunks(&encode_base64(encrypted.as_bytes()), self.chunk_size)?;
        debug!(chunks = chunks.len(), "chunked encrypted payload");
        let data_cids = upload_chunks_ordered(&self.store, &chunks).await?;

        let manifest = WrappedKeyManifest {
            aes_key: encode_base64(&wrapped.encrypted_key),
            iv: encode_base64(&wrapped.encrypted_iv),
            data_cids,
        };
        let address = manifest.publish(&self.store).await?;
        info!(cid = %address, "published manifest");
        Ok(address)
    }

    /// Consumer direction: manifest address in, recovered plaintext out.
    /// Fails closed at every step.
    pub async fn consume(
        &self,
        data_private_key: &RsaPrivateKey,
        manifest_address: &str,
    ) -> SdxResult<Vec<u8>> {
        let manifest = WrappedKeyManifest::fetch(&self.store, manifest_address).await?;
        debug!(chunks = manifest.data_cids.len(), "fetched manifest");

        let chunks = fetch_chunks_ordered(&self.store, &manifest.data_cids).await?;
        let ciphertext = decode_base64(&join_chunks(&chunks))?;

        let session = unwrap_session_key(
            &decode_base64(&manifest.aes_key)?,
            &decode_base64(&manifest.iv)?,
            data_private_key,
        )?;

        let plaintext = decrypt_payload(&EncryptedPayload::from_bytes(ciphertext), &session)?;
        info!(bytes = plaintext.len(), "recovered payload");
        Ok(plaintext)
    }
}

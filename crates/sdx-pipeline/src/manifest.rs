//! The wrapped-key manifest: the single externally shared handle for an
//! encrypted payload
//!
//! Wire format (persisted, stable):
//! `{ "aesKey": <b64>, "iv": <b64>, "dataCids": [<address>, ...] }`
//!
//! `dataCids` order is significant: consumers reassemble chunks in array
//! order, never address-sorted.

use serde::{Deserialize, Serialize};

use sdx_core::{SdxError, SdxResult};
use sdx_store::ContentStore;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WrappedKeyManifest {
    /// Base64 of the OAEP-wrapped 32-byte session key
    pub aes_key: String,
    /// Base64 of the OAEP-wrapped 12-byte nonce
    pub iv: String,
    /// Chunk addresses in upload order
    pub data_cids: Vec<String>,
}

impl WrappedKeyManifest {
    /// Upload the manifest as a final, distinct object. The returned
    /// address is the pipeline's externally visible result.
    pub async fn publish(&self, store: &impl ContentStore) -> SdxResult<String> {
        let body = serde_json::to_vec(self)
            .map_err(|e| SdxError::MalformedEncoding(format!("manifest: {e}")))?;
        store.put(body).await
    }

    pub async fn fetch(store: &impl ContentStore, address: &str) -> SdxResult<Self> {
        let body = store.get(address).await?;
        serde_json::from_slice(&body)
            .map_err(|e| SdxError::MalformedEncoding(format!("manifest {address}: {e}")))
    }
}

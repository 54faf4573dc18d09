//! Store abstraction and ordered chunk transfer
//!
//! Chunks are persisted as small JSON envelopes (`{"data": "<base64>"}`),
//! the shape the read gateway hands back, so the consume side can unwrap
//! them without knowing which backend stored them.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use sdx_core::{SdxError, SdxResult};

/// A content-addressable store: `put` returns the address the store
/// assigned, `get` retrieves previously stored bytes.
#[async_trait]
pub trait ContentStore: Send + Sync {
    async fn put(&self, bytes: Vec<u8>) -> SdxResult<String>;
    async fn get(&self, address: &str) -> SdxResult<Vec<u8>>;
}

#[derive(Serialize, Deserialize)]
struct ChunkEnvelope {
    data: String,
}

/// Upload chunks one by one, preserving order in the returned addresses.
///
/// If any upload fails the whole operation fails with
/// `PartialUploadFailure` carrying the addresses already committed, so the
/// caller can resume from the failed index rather than restart.
pub async fn upload_chunks_ordered(
    store: &impl ContentStore,
    chunks: &[String],
) -> SdxResult<Vec<String>> {
    let mut committed = Vec::with_capacity(chunks.len());

    for (index, chunk) in chunks.iter().enumerate() {
        let body = serde_json::to_vec(&ChunkEnvelope {
            data: chunk.clone(),
        })
        .map_err(|e| SdxError::MalformedEncoding(format!("chunk envelope: {e}")))?;

        match store.put(body).await {
            Ok(address) => {
                debug!(index, cid = %address, "uploaded chunk");
                committed.push(address);
            }
            Err(err) => {
                return Err(SdxError::PartialUploadFailure {
                    committed,
                    failed_index: index,
                    reason: err.to_string(),
                });
            }
        }
    }

    Ok(committed)
}

/// Fetch chunks for the given addresses, in the given order.
///
/// Fetches run concurrently; the result order follows the input order, not
/// completion order, because reassembly is order-dependent.
pub async fn fetch_chunks_ordered(
    store: &impl ContentStore,
    addresses: &[String],
) -> SdxResult<Vec<String>> {
    let fetches = addresses.iter().map(|address| store.get(address));
    let bodies = futures::future::try_join_all(fetches).await?;

    bodies
        .into_iter()
        .zip(addresses)
        .map(|(body, address)| {
            let envelope: ChunkEnvelope = serde_json::from_slice(&body).map_err(|e| {
                SdxError::MalformedEncoding(format!("chunk {address} envelope: {e}"))
            })?;
            Ok(envelope.data)
        })
        .collect()
}

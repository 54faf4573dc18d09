use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{SdxError, SdxResult};

/// Base64 characters per uploaded chunk, sized to keep each store request
/// comfortably under typical request-body limits.
pub const DEFAULT_CHUNK_SIZE: usize = 2000;

/// Top-level pipeline configuration (loaded from sdx.toml)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub upstream: UpstreamConfig,
    pub store: StoreConfig,
    /// Base64 characters per uploaded chunk
    pub chunk_size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Upstream payload API endpoint, queried with a bearer credential
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Content store upload endpoint (bearer-authenticated POST)
    pub upload_url: String,
    /// Read gateway. A `{cid}` placeholder is substituted with the content
    /// address; without one the address is appended as a path segment.
    pub gateway_url: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            upstream: UpstreamConfig::default(),
            store: StoreConfig::default(),
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            url: "https://www.googleapis.com/fitness/v1/users/me/sessions".into(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            upload_url: "https://api.nft.storage/upload".into(),
            gateway_url: "https://{cid}.ipfs.nftstorage.link/".into(),
        }
    }
}

impl PipelineConfig {
    pub fn load(path: &Path) -> SdxResult<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| SdxError::Config(format!("reading {}: {e}", path.display())))?;
        toml::from_str(&text)
            .map_err(|e| SdxError::Config(format!("parsing {}: {e}", path.display())))
    }
}

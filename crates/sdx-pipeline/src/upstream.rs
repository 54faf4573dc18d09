//! Upstream payload API collaborator
//!
//! The pipeline treats it as `fetch(bearer) -> body | error`. Retry and
//! timeout policy belong to the caller's substrate, not here.

use async_trait::async_trait;

use sdx_core::{SdxError, SdxResult};

#[async_trait]
pub trait UpstreamApi: Send + Sync {
    /// Fetch the sensitive payload using a bearer credential.
    async fn fetch(&self, bearer: &str) -> SdxResult<Vec<u8>>;
}

/// HTTP GET collaborator returning the raw response body.
pub struct HttpUpstream {
    client: reqwest::Client,
    url: String,
}

impl HttpUpstream {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }
}

#[async_trait]
impl UpstreamApi for HttpUpstream {
    async fn fetch(&self, bearer: &str) -> SdxResult<Vec<u8>> {
        let response = self
            .client
            .get(&self.url)
            .bearer_auth(bearer)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .send()
            .await
            .map_err(|e| SdxError::UpstreamFetchFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SdxError::UpstreamFetchFailed(format!(
                "upstream returned status {status}"
            )));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| SdxError::UpstreamFetchFailed(e.to_string()))?;
        Ok(body.to_vec())
    }
}

//! HTTP backend for a bearer-authenticated content store
//!
//! Uploads POST raw bytes to the upload endpoint and read the assigned
//! address from the `{"value": {"cid": ...}}` response body. Reads go
//! through a public gateway addressed by CID.
//!
//! Uploads send `Content-Type: */*`, the well-formed spelling of the
//! bare `*` wildcard some store clients send; the endpoint accepts both.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::debug;

use sdx_core::{SdxError, SdxResult};

use crate::client::ContentStore;

pub struct HttpContentStore {
    client: reqwest::Client,
    upload_url: String,
    gateway_url: String,
    auth: SecretString,
}

#[derive(Deserialize)]
struct UploadResponse {
    value: UploadValue,
}

#[derive(Deserialize)]
struct UploadValue {
    cid: String,
}

impl HttpContentStore {
    pub fn new(
        upload_url: impl Into<String>,
        gateway_url: impl Into<String>,
        auth: SecretString,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            upload_url: upload_url.into(),
            gateway_url: gateway_url.into(),
            auth,
        }
    }

    fn read_url(&self, address: &str) -> String {
        if self.gateway_url.contains("{cid}") {
            self.gateway_url.replace("{cid}", address)
        } else {
            format!("{}/{}", self.gateway_url.trim_end_matches('/'), address)
        }
    }
}

#[async_trait]
impl ContentStore for HttpContentStore {
    async fn put(&self, bytes: Vec<u8>) -> SdxResult<String> {
        let response = self
            .client
            .post(&self.upload_url)
            .bearer_auth(self.auth.expose_secret())
            .header(reqwest::header::CONTENT_TYPE, "*/*")
            .body(bytes)
            .send()
            .await
            .map_err(|e| SdxError::StoreUnavailable(format!("upload: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SdxError::StoreUnavailable(format!(
                "upload returned status {status}"
            )));
        }

        let parsed: UploadResponse = response
            .json()
            .await
            .map_err(|e| SdxError::StoreUnavailable(format!("upload response: {e}")))?;

        debug!(cid = %parsed.value.cid, "store accepted object");
        Ok(parsed.value.cid)
    }

    async fn get(&self, address: &str) -> SdxResult<Vec<u8>> {
        let url = self.read_url(address);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| SdxError::StoreUnavailable(format!("fetch {address}: {e}")))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(SdxError::NotFound(address.to_string()));
        }
        if !status.is_success() {
            return Err(SdxError::StoreUnavailable(format!(
                "fetch {address} returned status {status}"
            )));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| SdxError::StoreUnavailable(format!("fetch {address}: {e}")))?;
        Ok(body.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(gateway: &str) -> HttpContentStore {
        HttpContentStore::new(
            "https://store.example/upload",
            gateway,
            SecretString::from("test-token".to_string()),
        )
    }

    #[test]
    fn read_url_substitutes_cid_placeholder() {
        let s = store("https://{cid}.ipfs.gateway.example/");
        assert_eq!(
            s.read_url("bafyabc"),
            "https://bafyabc.ipfs.gateway.example/"
        );
    }

    #[test]
    fn read_url_appends_path_without_placeholder() {
        let s = store("https://gateway.example/ipfs/");
        assert_eq!(s.read_url("bafyabc"), "https://gateway.example/ipfs/bafyabc");
    }
}

//! Start-up secrets bundle
//!
//! Supplied by an external provisioning collaborator as an opaque
//! configuration blob; the pipeline never generates or stores these
//! long-term. All inputs are explicit — no ambient process environment.

use std::path::Path;

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use sdx_core::{SdxError, SdxResult};
use sdx_crypto::RsaPrivateKey;

#[derive(Deserialize)]
pub struct ProviderSecrets {
    /// Base64 PKCS#8 DER of the token private key. Decrypts inbound
    /// access tokens; never leaves the producer's trusted context, so a
    /// consumer-side bundle omits it.
    #[serde(default)]
    pub token_key: Option<SecretString>,
    /// Bearer token for the content store upload endpoint
    pub store_auth: SecretString,
}

impl ProviderSecrets {
    pub fn load(path: &Path) -> SdxResult<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| SdxError::Config(format!("reading {}: {e}", path.display())))?;
        toml::from_str(&text)
            .map_err(|e| SdxError::Config(format!("parsing {}: {e}", path.display())))
    }

    /// Decode and import the token private key. Fails if the bundle was
    /// provisioned without one.
    pub fn token_private_key(&self) -> SdxResult<RsaPrivateKey> {
        let token_key = self
            .token_key
            .as_ref()
            .ok_or_else(|| SdxError::Config("secrets bundle has no token_key".into()))?;
        let der = sdx_codec::decode_base64(token_key.expose_secret().trim())?;
        sdx_crypto::import_private(&der)
    }
}

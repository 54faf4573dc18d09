//! sdx-pipeline: end-to-end secure data exchange
//!
//! Two directions over the same primitives:
//!
//! Provide: unwrap access token → fetch upstream payload → encrypt under a
//! fresh session key → wrap key material for the recipient → chunk and
//! upload ciphertext → publish manifest. Fails closed: nothing is uploaded
//! until token unwrap and upstream fetch have succeeded, and no manifest
//! is published unless every chunk committed.
//!
//! Consume: fetch manifest → fetch chunks in manifest order → join →
//! decode → unwrap session key → authenticated-decrypt. Any failure
//! terminates with no plaintext released.

pub mod manifest;
pub mod pipeline;
pub mod secrets;
pub mod upstream;

pub use manifest::WrappedKeyManifest;
pub use pipeline::{Pipeline, ProvideRequest};
pub use secrets::ProviderSecrets;
pub use upstream::{HttpUpstream, UpstreamApi};

//! End-to-end provide/consume scenarios against an in-memory store

use std::sync::OnceLock;

use async_trait::async_trait;
use rsa::Oaep;
use sha2::Sha256;

use sdx_codec::encode_base64;
use sdx_core::{SdxError, SdxResult};
use sdx_crypto::{export_public, generate_keypair, KeyPair};
use sdx_pipeline::{Pipeline, ProvideRequest, UpstreamApi, WrappedKeyManifest};
use sdx_store::MemoryStore;

const PAYLOAD: &[u8] = b"{\"session\":[1,2,3]}";
const ACCESS_TOKEN: &str = "ya29.test-access-token";

// 4096-bit keygen is expensive; share the pairs across the test binary
fn token_pair() -> &'static KeyPair {
    static PAIR: OnceLock<KeyPair> = OnceLock::new();
    PAIR.get_or_init(|| generate_keypair().unwrap())
}

fn data_pair() -> &'static KeyPair {
    static PAIR: OnceLock<KeyPair> = OnceLock::new();
    PAIR.get_or_init(|| generate_keypair().unwrap())
}

/// Upstream stub: hands out the payload only for the expected bearer.
struct StubUpstream;

#[async_trait]
impl UpstreamApi for StubUpstream {
    async fn fetch(&self, bearer: &str) -> SdxResult<Vec<u8>> {
        if bearer != ACCESS_TOKEN {
            return Err(SdxError::UpstreamFetchFailed("status 401".into()));
        }
        Ok(PAYLOAD.to_vec())
    }
}

fn provide_request() -> ProvideRequest {
    let encrypted_token = token_pair()
        .public
        .encrypt(
            &mut rand::thread_rng(),
            Oaep::new::<Sha256>(),
            ACCESS_TOKEN.as_bytes(),
        )
        .unwrap();
    ProvideRequest {
        encrypted_token: encode_base64(&encrypted_token),
        data_public_key: encode_base64(&export_public(data_pair()).unwrap()),
    }
}

#[tokio::test]
async fn provide_then_consume_roundtrip_at_chunk_size_5() {
    let store = MemoryStore::new();
    let pipeline = Pipeline::new(store, 5).unwrap();

    let address = pipeline
        .provide(&StubUpstream, &token_pair().private, &provide_request())
        .await
        .unwrap();

    let plaintext = pipeline
        .consume(&data_pair().private, &address)
        .await
        .unwrap();
    assert_eq!(plaintext, PAYLOAD);
}

#[tokio::test]
async fn consume_with_wrong_private_key_is_decryption_failed() {
    let store = MemoryStore::new();
    let pipeline = Pipeline::new(store, 5).unwrap();

    let address = pipeline
        .provide(&StubUpstream, &token_pair().private, &provide_request())
        .await
        .unwrap();

    // token pair is not the data pair
    let err = pipeline
        .consume(&token_pair().private, &address)
        .await
        .unwrap_err();
    assert!(matches!(err, SdxError::DecryptionFailed));
}

#[tokio::test]
async fn provide_with_wrong_token_key_uploads_nothing() {
    let store = MemoryStore::new();
    let pipeline = Pipeline::new(store, 5).unwrap();

    let err = pipeline
        .provide(&StubUpstream, &data_pair().private, &provide_request())
        .await
        .unwrap_err();
    assert!(matches!(err, SdxError::DecryptionFailed));
    assert!(pipeline.store().is_empty());
}

#[tokio::test]
async fn upstream_failure_aborts_before_any_upload() {
    struct FailingUpstream;

    #[async_trait]
    impl UpstreamApi for FailingUpstream {
        async fn fetch(&self, _bearer: &str) -> SdxResult<Vec<u8>> {
            Err(SdxError::UpstreamFetchFailed("status 503".into()))
        }
    }

    let store = MemoryStore::new();
    let pipeline = Pipeline::new(store, 5).unwrap();

    let err = pipeline
        .provide(&FailingUpstream, &token_pair().private, &provide_request())
        .await
        .unwrap_err();
    assert!(matches!(err, SdxError::UpstreamFetchFailed(_)));
    assert!(pipeline.store().is_empty());
}

#[tokio::test]
async fn failed_chunk_upload_publishes_no_manifest() {
    let store = MemoryStore::new();
    store.fail_after_puts(2);
    let pipeline = Pipeline::new(store, 5).unwrap();

    let err = pipeline
        .provide(&StubUpstream, &token_pair().private, &provide_request())
        .await
        .unwrap_err();
    match err {
        SdxError::PartialUploadFailure {
            committed,
            failed_index,
            ..
        } => {
            assert_eq!(committed.len(), 2);
            assert_eq!(failed_index, 2);
        }
        other => panic!("expected PartialUploadFailure, got {other:?}"),
    }
    // only the two committed chunks exist; no manifest was published
    assert_eq!(pipeline.store().len(), 2);
}

#[tokio::test]
async fn permuted_chunk_order_never_yields_plaintext() {
    let store = MemoryStore::new();
    let pipeline = Pipeline::new(store, 5).unwrap();

    let address = pipeline
        .provide(&StubUpstream, &token_pair().private, &provide_request())
        .await
        .unwrap();

    // rewrite the manifest with two chunk refs swapped
    let mut manifest = WrappedKeyManifest::fetch(pipeline.store(), &address)
        .await
        .unwrap();
    assert!(
        manifest.data_cids[0] != manifest.data_cids[1],
        "ciphertext chunks should differ"
    );
    manifest.data_cids.swap(0, 1);
    let permuted_address = manifest.publish(pipeline.store()).await.unwrap();

    let result = pipeline.consume(&data_pair().private, &permuted_address).await;
    assert!(result.is_err(), "permuted chunk order must not decrypt");
}

#[tokio::test]
async fn consume_missing_manifest_is_not_found() {
    let pipeline = Pipeline::new(MemoryStore::new(), 5).unwrap();
    let err = pipeline
        .consume(&data_pair().private, "missing-address")
        .await
        .unwrap_err();
    assert!(matches!(err, SdxError::NotFound(_)));
}

#[tokio::test]
async fn zero_chunk_size_is_rejected_up_front() {
    let err = Pipeline::new(MemoryStore::new(), 0).unwrap_err();
    assert!(matches!(err, SdxError::InvalidChunkSize(0)));
}

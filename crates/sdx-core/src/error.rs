use thiserror::Error;

pub type SdxResult<T> = Result<T, SdxError>;

#[derive(Debug, Error)]
pub enum SdxError {
    #[error("malformed encoding: {0}")]
    MalformedEncoding(String),

    #[error("invalid chunk size: {0}")]
    InvalidChunkSize(usize),

    #[error("invalid key material: {0}")]
    InvalidKeyMaterial(String),

    /// Asymmetric decryption failed. Deliberately carries no cause: wrong
    /// key, corrupted ciphertext and tampering must be indistinguishable
    /// to the caller.
    #[error("decryption failed")]
    DecryptionFailed,

    /// Authenticated decryption rejected the payload before releasing any
    /// plaintext.
    #[error("payload authentication failed")]
    AuthenticationFailed,

    #[error("upstream fetch failed: {0}")]
    UpstreamFetchFailed(String),

    /// An ordered chunk upload stopped partway. `committed` holds the
    /// addresses already accepted by the store, in upload order, so the
    /// caller can resume from `failed_index` instead of re-uploading
    /// everything.
    #[error("chunk upload failed at index {failed_index} ({} committed): {reason}", .committed.len())]
    PartialUploadFailure {
        committed: Vec<String>,
        failed_index: usize,
        reason: String,
    },

    #[error("not found: {0}")]
    NotFound(String),

    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("config error: {0}")]
    Config(String),

    /// A primitive failed on the encryption side, where the inputs are
    /// locally generated and no untrusted key material is in play.
    #[error("internal error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_upload_failure_reports_committed_count() {
        let err = SdxError::PartialUploadFailure {
            committed: vec!["bafy-a".into(), "bafy-b".into()],
            failed_index: 2,
            reason: "store unavailable: 503".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("index 2"));
        assert!(msg.contains("2 committed"));
    }

    #[test]
    fn decryption_failed_message_carries_no_cause() {
        assert_eq!(SdxError::DecryptionFailed.to_string(), "decryption failed");
    }
}

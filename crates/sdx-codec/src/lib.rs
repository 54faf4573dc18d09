//! sdx-codec: base64 ⇄ binary conversion and fixed-size chunk framing
//!
//! Ciphertext travels through the content store as base64 text, split into
//! size-bounded chunks. `join_chunks` is the exact left inverse of
//! `split_into_chunks`, so reassembly in manifest order reproduces the
//! original encoding byte for byte.

use base64::{engine::general_purpose::STANDARD as B64, Engine};

use sdx_core::{SdxError, SdxResult};

/// Encode raw bytes as standard (padded) base64 text.
pub fn encode_base64(bytes: &[u8]) -> String {
    B64.encode(bytes)
}

/// Decode standard base64 text back to raw bytes.
///
/// Fails with `MalformedEncoding` on an invalid alphabet or bad padding.
pub fn decode_base64(text: &str) -> SdxResult<Vec<u8>> {
    B64.decode(text)
        .map_err(|e| SdxError::MalformedEncoding(format!("base64: {e}")))
}

/// Split `text` into an ordered, leftmost-first sequence of chunks of at
/// most `max_len` bytes. The last chunk may be shorter. Empty input yields
/// an empty sequence.
///
/// Chunk boundaries are backed off to char boundaries, so the split is
/// total over valid UTF-8; for the base64 text this crate frames, every
/// chunk is exactly `max_len` bytes except the last.
pub fn split_into_chunks(text: &str, max_len: usize) -> SdxResult<Vec<String>> {
    if max_len == 0 {
        return Err(SdxError::InvalidChunkSize(0));
    }

    let mut chunks = Vec::with_capacity(text.len().div_ceil(max_len));
    let mut rest = text;
    while !rest.is_empty() {
        let mut end = max_len.min(rest.len());
        while !rest.is_char_boundary(end) {
            end -= 1;
        }
        if end == 0 {
            // single char wider than max_len; emit it whole
            end = rest.chars().next().map(char::len_utf8).unwrap_or(rest.len());
        }
        let (head, tail) = rest.split_at(end);
        chunks.push(head.to_string());
        rest = tail;
    }
    Ok(chunks)
}

/// Concatenate chunks in input order.
pub fn join_chunks<S: AsRef<str>>(chunks: &[S]) -> String {
    let mut joined = String::with_capacity(chunks.iter().map(|c| c.as_ref().len()).sum());
    for chunk in chunks {
        joined.push_str(chunk.as_ref());
    }
    joined
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn base64_roundtrip() {
        let bytes = b"arbitrary \x00\xff binary";
        let encoded = encode_base64(bytes);
        assert_eq!(decode_base64(&encoded).unwrap(), bytes);
    }

    #[test]
    fn decode_rejects_bad_alphabet() {
        let err = decode_base64("not!valid@base64").unwrap_err();
        assert!(matches!(err, SdxError::MalformedEncoding(_)));
    }

    #[test]
    fn decode_rejects_bad_padding() {
        let err = decode_base64("QUJD=").unwrap_err();
        assert!(matches!(err, SdxError::MalformedEncoding(_)));
    }

    #[test]
    fn split_empty_yields_no_chunks() {
        assert!(split_into_chunks("", 5).unwrap().is_empty());
    }

    #[test]
    fn split_rejects_zero_max_len() {
        let err = split_into_chunks("abc", 0).unwrap_err();
        assert!(matches!(err, SdxError::InvalidChunkSize(0)));
    }

    #[test]
    fn split_is_leftmost_first() {
        let chunks = split_into_chunks("abcdefgh", 3).unwrap();
        assert_eq!(chunks, vec!["abc", "def", "gh"]);
    }

    #[test]
    fn split_exact_multiple_has_no_short_tail() {
        let chunks = split_into_chunks("abcdef", 3).unwrap();
        assert_eq!(chunks, vec!["abc", "def"]);
    }

    #[test]
    fn split_respects_char_boundaries() {
        // 'é' is two bytes; a 3-byte chunk can't split it
        let chunks = split_into_chunks("aéé", 3).unwrap();
        assert_eq!(join_chunks(&chunks), "aéé");
        for chunk in &chunks {
            assert!(chunk.len() <= 3);
        }
    }

    #[test]
    fn join_is_order_sensitive() {
        let chunks = split_into_chunks("abcdef", 2).unwrap();
        let mut permuted = chunks.clone();
        permuted.swap(0, 2);
        assert_ne!(join_chunks(&permuted), "abcdef");
    }

    proptest! {
        /// join is the exact left inverse of split for every max_len
        #[test]
        fn split_join_roundtrip(
            text in "\\PC{0,300}",
            max_len in 1usize..=32,
        ) {
            let chunks = split_into_chunks(&text, max_len).unwrap();
            prop_assert_eq!(join_chunks(&chunks), text);
        }

        /// every max_len up to len+5 round-trips for base64-alphabet text
        #[test]
        fn split_join_roundtrip_ascii_window(text in "[A-Za-z0-9+/=]{1,64}") {
            for max_len in 1..=text.len() + 5 {
                let chunks = split_into_chunks(&text, max_len).unwrap();
                prop_assert_eq!(join_chunks(&chunks), text.clone());
                for chunk in &chunks {
                    prop_assert!(chunk.len() <= max_len);
                }
            }
        }
    }
}

//! In-memory store backend for tests and local runs
//!
//! Addresses are BLAKE3 hashes of the stored bytes, so this backend
//! happens to dedup identical content. Callers must not rely on that:
//! real stores make no such promise.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use sdx_core::{SdxError, SdxResult};

use crate::client::ContentStore;

#[derive(Debug, Default)]
pub struct MemoryStore {
    objects: Mutex<HashMap<String, Vec<u8>>>,
    remaining_puts: Mutex<Option<usize>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inject a failure: the next `n` puts succeed, every one after that
    /// reports the store as unavailable.
    pub fn fail_after_puts(&self, n: usize) {
        *self.remaining_puts.lock().unwrap() = Some(n);
    }

    pub fn len(&self) -> usize {
        self.objects.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, address: &str) -> bool {
        self.objects.lock().unwrap().contains_key(address)
    }
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn put(&self, bytes: Vec<u8>) -> SdxResult<String> {
        if let Some(remaining) = self.remaining_puts.lock().unwrap().as_mut() {
            if *remaining == 0 {
                return Err(SdxError::StoreUnavailable("injected failure".into()));
            }
            *remaining -= 1;
        }

        let address = blake3::hash(&bytes).to_hex().to_string();
        self.objects.lock().unwrap().insert(address.clone(), bytes);
        Ok(address)
    }

    async fn get(&self, address: &str) -> SdxResult<Vec<u8>> {
        self.objects
            .lock()
            .unwrap()
            .get(address)
            .cloned()
            .ok_or_else(|| SdxError::NotFound(address.to_string()))
    }
}

//! sdx-store: client for the content-addressable chunk store
//!
//! The store itself owns durability; this crate is a pass-through. It
//! never assumes address stability across re-uploads of identical bytes —
//! dedup behavior is store-dependent — so it always tracks the address
//! the store actually returned.

pub mod client;
pub mod http;
pub mod memory;

pub use client::{fetch_chunks_ordered, upload_chunks_ordered, ContentStore};
pub use http::HttpContentStore;
pub use memory::MemoryStore;

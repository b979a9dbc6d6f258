//! Storage Module
//!
//! A thread-safe, sharded key-value store with lazy TTL expiry.
//!
//! ## Features
//!
//! - **Sharded Storage**: 64 independent shards reduce lock contention
//! - **RwLock**: Multiple concurrent readers, exclusive writers
//! - **TTL Support**: Entries may carry a millisecond time-to-live
//! - **Lazy Expiry**: Expired entries are only removed when a read finds them
//!
//! ## Example
//!
//! ```
//! use flintkv::storage::Store;
//! use bytes::Bytes;
//! use std::time::Duration;
//!
//! let store = Store::new();
//! store.set(Bytes::from("session"), Bytes::from("token123"), Some(Duration::from_secs(3600)));
//! assert!(store.get(&Bytes::from("session")).is_some());
//! ```

pub mod engine;

pub use engine::{Entry, Store, StoreStats};

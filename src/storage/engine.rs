//! Sharded Store with Lazy Expiry
//!
//! This module owns all cache state. Nothing outside it touches the underlying maps;
//! callers only see atomic `get` and `set` operations.
//!
//! ## Design Decisions
//!
//! 1. **Sharded Locks**: 64 shards, each behind its own `RwLock`, so writes to
//!    different keys rarely contend.
//! 2. **Lazy Expiry**: An expired entry stays in its shard until the next `get`
//!    of that key notices it, or until a `set` overwrites it. There is no sweeper.
//! 3. **Wholesale Replacement**: `set` always installs a fresh `Entry`; value and
//!    expiry are never updated separately.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                          Store                              │
//! │  ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐           │
//! │  │ Shard 0 │ │ Shard 1 │ │ Shard 2 │ │ Shard N │           │
//! │  │ RwLock  │ │ RwLock  │ │ RwLock  │ │ RwLock  │           │
//! │  │ HashMap │ │ HashMap │ │ HashMap │ │ HashMap │           │
//! │  └─────────┘ └─────────┘ └─────────┘ └─────────┘           │
//! └─────────────────────────────────────────────────────────────┘
//! ```

use bytes::Bytes;
use std::collections::HashMap;
use std::hash::{DefaultHasher, Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{Duration, Instant};

/// Number of shards in the store.
const NUM_SHARDS: usize = 64;

/// A stored value with optional expiry time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub value: Bytes,
    /// None = never expires
    pub expires_at: Option<Instant>,
}

impl Entry {
    /// Creates an entry, expiring `ttl` from now if given.
    ///
    /// A deadline too far out to represent is treated as no deadline.
    pub fn new(value: Bytes, ttl: Option<Duration>) -> Self {
        Self {
            value,
            expires_at: ttl.and_then(|ttl| Instant::now().checked_add(ttl)),
        }
    }

    /// An entry is expired once its deadline is at or before `now`.
    #[inline]
    pub fn is_expired_at(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|exp| exp <= now)
    }

    #[inline]
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Instant::now())
    }
}

#[derive(Debug, Default)]
struct Shard {
    data: RwLock<HashMap<Bytes, Entry>>,
}

impl Shard {
    // Entries are inserted and removed whole, so a poisoned map is still consistent.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<Bytes, Entry>> {
        self.data.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<Bytes, Entry>> {
        self.data.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Point-in-time counters for the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStats {
    /// Entries physically present, stale ones included
    pub keys: u64,
    pub get_ops: u64,
    pub set_ops: u64,
    pub hits: u64,
    pub misses: u64,
    /// Entries removed because a read found them expired
    pub expired: u64,
}

/// The process-wide key-value store.
///
/// Wrap it in an `Arc` and share it across every connection task.
///
/// # Example
///
/// ```
/// use flintkv::storage::Store;
/// use bytes::Bytes;
/// use std::time::Duration;
///
/// let store = Store::new();
///
/// store.set(Bytes::from("name"), Bytes::from("flint"), None);
/// assert_eq!(store.get(&Bytes::from("name")), Some(Bytes::from("flint")));
///
/// store.set(Bytes::from("gone"), Bytes::from("soon"), Some(Duration::ZERO));
/// assert_eq!(store.get(&Bytes::from("gone")), None);
/// ```
pub struct Store {
    shards: Vec<Shard>,
    key_count: AtomicU64,
    get_count: AtomicU64,
    set_count: AtomicU64,
    hit_count: AtomicU64,
    miss_count: AtomicU64,
    expired_count: AtomicU64,
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("shards", &self.shards.len())
            .field("key_count", &self.key_count.load(Ordering::Relaxed))
            .finish()
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl Store {
    pub fn new() -> Self {
        Self {
            shards: (0..NUM_SHARDS).map(|_| Shard::default()).collect(),
            key_count: AtomicU64::new(0),
            get_count: AtomicU64::new(0),
            set_count: AtomicU64::new(0),
            hit_count: AtomicU64::new(0),
            miss_count: AtomicU64::new(0),
            expired_count: AtomicU64::new(0),
        }
    }

    #[inline]
    fn shard(&self, key: &[u8]) -> &Shard {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        &self.shards[(hasher.finish() as usize) % NUM_SHARDS]
    }

    /// Stores `value` under `key`, replacing any previous entry.
    ///
    /// With `ttl`, the entry expires `ttl` from now; `Duration::ZERO` makes it
    /// expired on the very next read.
    ///
    /// Returns `true` if the key was not present before.
    pub fn set(&self, key: Bytes, value: Bytes, ttl: Option<Duration>) -> bool {
        self.set_count.fetch_add(1, Ordering::Relaxed);

        let entry = Entry::new(value, ttl);

        // Counted under the shard lock so a racing expiry never decrements first
        let mut data = self.shard(&key).write();
        let is_new = data.insert(key, entry).is_none();
        if is_new {
            self.key_count.fetch_add(1, Ordering::Relaxed);
        }

        is_new
    }

    /// Returns the value for `key`, or `None` if it is absent or expired.
    ///
    /// This is the only place expiry is enforced: an expired entry found here is
    /// removed before returning `None`.
    pub fn get(&self, key: &Bytes) -> Option<Bytes> {
        self.get_count.fetch_add(1, Ordering::Relaxed);

        let result = self.lookup(key);

        let counter = if result.is_some() {
            &self.hit_count
        } else {
            &self.miss_count
        };
        counter.fetch_add(1, Ordering::Relaxed);

        result
    }

    fn lookup(&self, key: &Bytes) -> Option<Bytes> {
        let shard = self.shard(key);

        // Fast path under the read lock
        {
            let data = shard.read();
            match data.get(key) {
                Some(entry) if !entry.is_expired() => return Some(entry.value.clone()),
                Some(_) => {}
                None => return None,
            }
        }

        // Re-check under the write lock: a concurrent set may have replaced the
        // stale entry between the two locks, and that fresh value must survive.
        let mut data = shard.write();
        match data.get(key) {
            Some(entry) if entry.is_expired() => {}
            Some(entry) => return Some(entry.value.clone()),
            None => return None,
        }

        data.remove(key);
        self.key_count.fetch_sub(1, Ordering::Relaxed);
        self.expired_count.fetch_add(1, Ordering::Relaxed);
        None
    }

    /// Returns true if an entry for `key` is physically present, expired or not.
    ///
    /// Does not trigger expiry.
    pub fn contains_raw(&self, key: &Bytes) -> bool {
        self.shard(key).read().contains_key(key)
    }

    /// Number of entries physically present, including ones that have expired
    /// but have not been read since.
    pub fn len(&self) -> u64 {
        self.key_count.load(Ordering::Relaxed)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> StoreStats {
        StoreStats {
            keys: self.key_count.load(Ordering::Relaxed),
            get_ops: self.get_count.load(Ordering::Relaxed),
            set_ops: self.set_count.load(Ordering::Relaxed),
            hits: self.hit_count.load(Ordering::Relaxed),
            misses: self.miss_count.load(Ordering::Relaxed),
            expired: self.expired_count.load(Ordering::Relaxed),
        }
    }
}

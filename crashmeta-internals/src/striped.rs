//! A lock-striped string map.
//!
//! The map is split into a power-of-two number of shards. Each key lives in
//! exactly one shard, chosen from the high bits of its [`FxBuildHasher`] hash,
//! and every shard is a [`hashbrown::HashMap`] behind its own reader-writer
//! lock. Writers to keys in different shards never contend.
//!
//! The element count is tracked separately in an [`AtomicUsize`] that is only
//! modified while the owning shard is write-locked, so [`StripedMap::len`] is
//! always the sum of the shard sizes at some instant in the recent past
//! without touching any lock.

use alloc::{boxed::Box, string::String, vec::Vec};
use core::{
    fmt,
    hash::BuildHasher,
    sync::atomic::{AtomicUsize, Ordering},
};

use hashbrown::HashMap;
use rustc_hash::FxBuildHasher;

use crate::lock::RwLock;

/// One partition of the map.
type Shard = HashMap<String, String, FxBuildHasher>;

/// Number of shards used by [`StripedMap::new`].
pub const DEFAULT_SHARDS: usize = 8;

/// Upper bound on the number of shards a map will allocate.
pub const MAX_SHARDS: usize = 1 << 10;

/// A concurrent `String -> String` map with per-shard locking.
///
/// All methods take `&self`. Individual lookups and upserts are atomic with
/// respect to each other. Whole-map operations ([`for_each`], [`snapshot`])
/// lock one shard at a time, so they see every entry whole but are not a
/// consistent cut across shards.
///
/// [`for_each`]: StripedMap::for_each
/// [`snapshot`]: StripedMap::snapshot
pub struct StripedMap {
    /// The partitions, `1 << shift` of them.
    shards: Box<[RwLock<Shard>]>,
    /// Number of high hash bits used to select a shard.
    shift: u32,
    /// Sum of the shard sizes.
    len: AtomicUsize,
}

impl StripedMap {
    /// Creates an empty map with [`DEFAULT_SHARDS`] shards.
    #[must_use]
    pub fn new() -> Self {
        Self::with_shards(DEFAULT_SHARDS)
    }

    /// Creates an empty map with at least `shards` shards.
    ///
    /// The count is rounded up to a power of two and clamped to
    /// `1..=MAX_SHARDS`.
    #[must_use]
    pub fn with_shards(shards: usize) -> Self {
        let count = shards.clamp(1, MAX_SHARDS).next_power_of_two();
        let shards = (0..count)
            .map(|_| RwLock::new(Shard::with_hasher(FxBuildHasher)))
            .collect::<Vec<_>>()
            .into_boxed_slice();

        Self {
            shards,
            shift: count.trailing_zeros(),
            len: AtomicUsize::new(0),
        }
    }

    /// Number of shards backing this map.
    #[must_use]
    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    /// The shard owning `key`.
    #[inline]
    fn shard(&self, key: &str) -> &RwLock<Shard> {
        if self.shift == 0 {
            return &self.shards[0];
        }
        let hash = FxBuildHasher.hash_one(key);
        // hashbrown buckets on the low bits; pick shards from the top ones.
        let index = (hash >> (u64::BITS - self.shift)) as usize;
        &self.shards[index]
    }

    /// Number of entries in the map.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len.load(Ordering::Acquire)
    }

    /// Returns `true` if the map holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` if `key` is present.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.shard(key).read().contains_key(key)
    }

    /// Returns a copy of the value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        self.get_with(key, |value| String::from(value))
    }

    /// Runs `f` on the value stored under `key` while its shard is
    /// read-locked.
    pub fn get_with<R>(&self, key: &str, f: impl FnOnce(&str) -> R) -> Option<R> {
        self.shard(key).read().get(key).map(|value| f(value.as_str()))
    }

    /// Inserts or overwrites `key`, returning the previous value.
    pub fn insert(&self, key: String, value: String) -> Option<String> {
        let mut shard = self.shard(&key).write();
        let previous = shard.insert(key, value);
        if previous.is_none() {
            self.len.fetch_add(1, Ordering::Release);
        }
        previous
    }

    /// Inserts every entry of `entries`, each as its own atomic upsert.
    pub fn extend<I>(&self, entries: I)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (key, value) in entries {
            self.insert(key, value);
        }
    }

    /// Calls `f` for every entry, locking one shard at a time.
    ///
    /// `f` must not write to this map: doing so from inside the callback
    /// would deadlock on the shard currently being visited.
    pub fn for_each(&self, mut f: impl FnMut(&str, &str)) {
        for shard in self.shards.iter() {
            for (key, value) in shard.read().iter() {
                f(key, value);
            }
        }
    }

    /// Copies every entry out of the map.
    #[must_use]
    pub fn snapshot(&self) -> Vec<(String, String)> {
        let mut entries = Vec::with_capacity(self.len());
        self.for_each(|key, value| entries.push((String::from(key), String::from(value))));
        entries
    }
}

impl Default for StripedMap {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for StripedMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        self.for_each(|key, value| {
            map.entry(&key, &value);
        });
        map.finish()
    }
}

//! The attribute store and its builder.

use alloc::{boxed::Box, string::String};
use core::fmt;

use crashmeta_internals::{RwLock, StripedMap, striped::DEFAULT_SHARDS};
use hashbrown::HashMap;
use rustc_hash::FxBuildHasher;
use triomphe::Arc;

use crate::{
    AttributeError, CustomKeys, Limits,
    hooks::{CapacityExceeded, CapacityHook, TracingLogger},
    sanitize,
};

/// Sanitized entries of one `set_custom_keys` call. Later duplicates win.
type Batch = HashMap<String, String, FxBuildHasher>;

/// User metadata attached to crash reports: a user id and a bounded set of
/// custom string attributes.
///
/// Every key, value and user id is sanitized on the way in (see
/// [`sanitize`](crate::sanitize)): surrounding whitespace is trimmed and the
/// result is cut to [`Limits::max_attribute_size`] UTF-16 code units. At most
/// [`Limits::max_attributes`] custom attributes are admitted; writes beyond
/// that are dropped and reported to the store's [`CapacityHook`] rather than
/// returned as errors, so metadata calls scattered through application code
/// never need error handling beyond a `None` key.
///
/// All methods take `&self` and may be called from any thread. Attributes are
/// kept in a lock-striped map, so writers to unrelated keys rarely contend.
///
/// # Capacity races
///
/// The capacity check and the write that follows are two steps. Concurrent
/// writers adding different new keys can each pass the check before either
/// writes, so under contention the store can end up a few entries above
/// [`Limits::max_attributes`]. The overshoot is bounded by the number of
/// concurrent writers.
///
/// # Examples
///
/// ```
/// use crashmeta::AttributeStore;
///
/// let store = AttributeStore::new();
/// store.set_user_id("  user-1234 ");
/// store.set_custom_key("screen", "checkout")?;
/// store.set_custom_keys([("cart_items", Some("3")), ("coupon", None)])?;
///
/// assert_eq!(store.user_id().as_deref(), Some("user-1234"));
///
/// let keys = store.custom_keys();
/// assert_eq!(keys.len(), 3);
/// assert_eq!(keys.get("coupon").as_deref(), Some(""));
/// # Ok::<(), crashmeta::AttributeError>(())
/// ```
pub struct AttributeStore {
    user_id: RwLock<Option<String>>,
    attributes: Arc<StripedMap>,
    limits: Limits,
    hook: Box<dyn CapacityHook>,
}

impl AttributeStore {
    /// Default maximum number of custom attributes.
    pub const MAX_ATTRIBUTES: usize = Limits::MAX_ATTRIBUTES;

    /// Default maximum attribute length in UTF-16 code units.
    pub const MAX_ATTRIBUTE_SIZE: usize = Limits::MAX_ATTRIBUTE_SIZE;

    /// Creates an empty store with default [`Limits`] that logs capacity
    /// rejections through [`TracingLogger`].
    #[must_use]
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Starts configuring a store.
    #[must_use]
    pub fn builder() -> AttributeStoreBuilder {
        AttributeStoreBuilder::new()
    }

    /// The limits this store enforces.
    #[must_use]
    pub fn limits(&self) -> Limits {
        self.limits
    }

    /// The current user id, or `None` if it was never set or was cleared.
    #[must_use]
    pub fn user_id(&self) -> Option<String> {
        self.user_id.read().clone()
    }

    /// Sanitizes and stores the user id, replacing any previous one.
    ///
    /// Passing `None` clears it. There is no capacity limit on the user id.
    pub fn set_user_id<'a>(&self, identifier: impl Into<Option<&'a str>>) {
        let identifier = self.limits.sanitize(identifier.into()).map(String::from);
        *self.user_id.write() = identifier;
    }

    /// A live read-only view of the custom attributes.
    ///
    /// See [`CustomKeys`].
    #[must_use]
    pub fn custom_keys(&self) -> CustomKeys {
        CustomKeys::new(Arc::clone(&self.attributes))
    }

    /// The value stored under `key` after sanitizing `key`.
    #[must_use]
    pub fn custom_key(&self, key: &str) -> Option<String> {
        let key = sanitize::sanitize_key(Some(key), self.limits.max_attribute_size).ok()?;
        self.attributes.get(key)
    }

    /// Number of custom attributes currently stored.
    #[must_use]
    pub fn custom_key_count(&self) -> usize {
        self.attributes.len()
    }

    /// Sets one custom attribute.
    ///
    /// Both `key` and `value` are sanitized; a `None` value is stored as the
    /// empty string. If the store is full and `key` is not already present
    /// the write is dropped, the capacity hook is called, and `Ok(())` is
    /// returned. Overwriting an existing key always succeeds.
    ///
    /// # Errors
    ///
    /// [`AttributeError::InvalidArgument`] if `key` is `None`. Nothing is
    /// written in that case.
    ///
    /// # Examples
    ///
    /// ```
    /// use crashmeta::{AttributeError, AttributeStore};
    ///
    /// let store = AttributeStore::new();
    /// store.set_custom_key(" level ", "  7 ")?;
    /// assert_eq!(store.custom_key("level").as_deref(), Some("7"));
    ///
    /// assert_eq!(
    ///     store.set_custom_key(None, "orphan"),
    ///     Err(AttributeError::InvalidArgument)
    /// );
    /// # Ok::<(), AttributeError>(())
    /// ```
    pub fn set_custom_key<'k, 'v>(
        &self,
        key: impl Into<Option<&'k str>>,
        value: impl Into<Option<&'v str>>,
    ) -> Result<(), AttributeError> {
        let key = sanitize::sanitize_key(key.into(), self.limits.max_attribute_size)?;

        let len = self.attributes.len();
        if len >= self.limits.max_attributes && !self.attributes.contains_key(key) {
            self.reject(len, 1);
            return Ok(());
        }

        let value = self.limits.sanitize(value.into()).unwrap_or_default();
        self.attributes.insert(String::from(key), String::from(value));
        Ok(())
    }

    /// Sets many custom attributes at once.
    ///
    /// Entries are sanitized like in [`set_custom_key`](Self::set_custom_key)
    /// and then split in two: keys already in the store, and new keys.
    /// Updates to existing keys are always written. The new keys are then
    /// admitted together or not at all: if adding all of them would take the
    /// store past [`Limits::max_attributes`], none are written and the
    /// capacity hook is called once, even if some of them would have fit.
    ///
    /// If the same key appears more than once in `entries`, the last
    /// occurrence wins.
    ///
    /// # Errors
    ///
    /// [`AttributeError::InvalidArgument`] if any entry has a `None` key. The
    /// whole batch is checked before anything is written, so the store is
    /// unchanged in that case.
    ///
    /// # Examples
    ///
    /// ```
    /// use crashmeta::AttributeStore;
    ///
    /// let store = AttributeStore::builder().max_attributes(2).build();
    /// store.set_custom_key("a", "1")?;
    ///
    /// // "a" is updated, but "b" and "c" together do not fit.
    /// store.set_custom_keys([("a", "2"), ("b", "x"), ("c", "y")])?;
    /// assert_eq!(store.custom_key("a").as_deref(), Some("2"));
    /// assert_eq!(store.custom_key_count(), 1);
    /// # Ok::<(), crashmeta::AttributeError>(())
    /// ```
    pub fn set_custom_keys<'k, 'v, I, K, V>(&self, entries: I) -> Result<(), AttributeError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<Option<&'k str>>,
        V: Into<Option<&'v str>>,
    {
        let max_size = self.limits.max_attribute_size;
        let mut to_update = Batch::default();
        let mut to_add = Batch::default();

        for (key, value) in entries {
            let key = sanitize::sanitize_key(key.into(), max_size)?;
            let value = self.limits.sanitize(value.into()).unwrap_or_default();

            if self.attributes.contains_key(key) {
                to_update.insert(String::from(key), String::from(value));
            } else {
                to_add.insert(String::from(key), String::from(value));
            }
        }

        self.attributes.extend(to_update);

        if to_add.is_empty() {
            return Ok(());
        }

        let len = self.attributes.len();
        if len + to_add.len() > self.limits.max_attributes {
            self.reject(len, to_add.len());
            return Ok(());
        }

        self.attributes.extend(to_add);
        Ok(())
    }

    fn reject(&self, current_len: usize, rejected: usize) {
        let event = CapacityExceeded::new(self.limits.max_attributes, current_len, rejected);
        self.hook.on_capacity_exceeded(&event);
    }
}

impl Default for AttributeStore {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for AttributeStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttributeStore")
            .field("user_id", &*self.user_id.read())
            .field("attributes", &*self.attributes)
            .field("limits", &self.limits)
            .finish_non_exhaustive()
    }
}

/// Builder for [`AttributeStore`].
///
/// # Examples
///
/// ```
/// use crashmeta::{AttributeStore, Limits, hooks::TracingLogger};
///
/// let store = AttributeStore::builder()
///     .limits(Limits::new(16, 256))
///     .shards(4)
///     .capacity_hook(TracingLogger)
///     .build();
///
/// assert_eq!(store.limits().max_attributes, 16);
/// ```
pub struct AttributeStoreBuilder {
    limits: Limits,
    shards: usize,
    hook: Box<dyn CapacityHook>,
}

impl AttributeStoreBuilder {
    /// A builder with default [`Limits`], the default shard count and
    /// [`TracingLogger`] as the capacity hook.
    #[must_use]
    pub fn new() -> Self {
        Self {
            limits: Limits::default(),
            shards: DEFAULT_SHARDS,
            hook: Box::new(TracingLogger),
        }
    }

    /// Replaces both limits.
    #[must_use]
    pub fn limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Sets the maximum number of custom attributes.
    #[must_use]
    pub fn max_attributes(mut self, max_attributes: usize) -> Self {
        self.limits.max_attributes = max_attributes;
        self
    }

    /// Sets the maximum attribute length in UTF-16 code units.
    #[must_use]
    pub fn max_attribute_size(mut self, max_attribute_size: usize) -> Self {
        self.limits.max_attribute_size = max_attribute_size;
        self
    }

    /// Sets the number of independently locked shards in the attribute map.
    ///
    /// Rounded up to a power of two. More shards reduce contention between
    /// writers at the cost of a little memory.
    #[must_use]
    pub fn shards(mut self, shards: usize) -> Self {
        self.shards = shards;
        self
    }

    /// Replaces the hook that is told about capacity rejections.
    ///
    /// The default [`TracingLogger`] is replaced, not wrapped; call it from
    /// your hook if you still want the log line.
    #[must_use]
    pub fn capacity_hook<H>(mut self, hook: H) -> Self
    where
        H: CapacityHook,
    {
        self.hook = Box::new(hook);
        self
    }

    /// Creates the store, empty and without a user id.
    #[must_use]
    pub fn build(self) -> AttributeStore {
        AttributeStore {
            user_id: RwLock::new(None),
            attributes: Arc::new(StripedMap::with_shards(self.shards)),
            limits: self.limits,
            hook: self.hook,
        }
    }
}

impl Default for AttributeStoreBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for AttributeStoreBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttributeStoreBuilder")
            .field("limits", &self.limits)
            .field("shards", &self.shards)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use alloc::format;
    use core::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[test]
    fn test_store_send_sync() {
        static_assertions::assert_impl_all!(AttributeStore: Send, Sync, Default);
        static_assertions::assert_not_impl_any!(AttributeStore: Clone);
    }

    #[test]
    fn test_new_store_is_empty() {
        let store = AttributeStore::new();
        assert_eq!(store.user_id(), None);
        assert_eq!(store.custom_key_count(), 0);
        assert_eq!(store.limits(), Limits::default());
    }

    #[test]
    fn test_user_id_round_trip() {
        let store = AttributeStore::new();
        store.set_user_id("  bob  ");
        assert_eq!(store.user_id().as_deref(), Some("bob"));

        store.set_user_id(None);
        assert_eq!(store.user_id(), None);
    }

    #[test]
    fn test_none_value_becomes_empty() {
        let store = AttributeStore::new();
        store.set_custom_key("k", None).unwrap();
        assert_eq!(store.custom_key("k").as_deref(), Some(""));
    }

    #[test]
    fn test_custom_key_lookup_is_sanitized() {
        let store = AttributeStore::new();
        store.set_custom_key("key", "value").unwrap();
        assert_eq!(store.custom_key("  key\t").as_deref(), Some("value"));
    }

    #[test]
    fn test_single_key_rejection_calls_hook_once() {
        static REJECTIONS: AtomicUsize = AtomicUsize::new(0);

        let store = AttributeStore::builder()
            .max_attributes(2)
            .capacity_hook(|event: &CapacityExceeded| {
                assert_eq!(event.max_attributes, 2);
                assert_eq!(event.current_len, 2);
                assert_eq!(event.rejected, 1);
                REJECTIONS.fetch_add(1, Ordering::Relaxed);
            })
            .build();

        store.set_custom_key("a", "1").unwrap();
        store.set_custom_key("b", "2").unwrap();
        store.set_custom_key("c", "3").unwrap();
        store.set_custom_key("a", "4").unwrap();

        assert_eq!(REJECTIONS.load(Ordering::Relaxed), 1);
        assert_eq!(store.custom_key("a").as_deref(), Some("4"));
        assert_eq!(store.custom_key("c"), None);
    }

    #[test]
    fn test_batch_duplicates_count_once() {
        let store = AttributeStore::builder().max_attributes(1).build();
        store
            .set_custom_keys([("dup", "first"), (" dup ", "second")])
            .unwrap();
        assert_eq!(store.custom_key_count(), 1);
        assert_eq!(store.custom_key("dup").as_deref(), Some("second"));
    }

    #[test]
    fn test_custom_max_attribute_size() {
        let store = AttributeStore::builder().max_attribute_size(4).build();
        store.set_custom_key("abcdefgh", "123456").unwrap();
        store.set_user_id("someone");
        assert_eq!(store.custom_key("abcd").as_deref(), Some("1234"));
        assert_eq!(store.user_id().as_deref(), Some("some"));
    }

    #[test]
    fn test_debug_output() {
        let store = AttributeStore::builder().shards(1).build();
        store.set_user_id("u");
        store.set_custom_key("k", "v").unwrap();
        let debug = format!("{store:?}");
        assert!(debug.starts_with(r#"AttributeStore { user_id: Some("u"), attributes: {"k": "v"}"#));
    }
}

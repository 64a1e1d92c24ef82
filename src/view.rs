//! The read-only view returned by [`AttributeStore::custom_keys`].
//!
//! [`AttributeStore::custom_keys`]: crate::AttributeStore::custom_keys

use alloc::{collections::BTreeMap, string::String, vec};
use core::fmt;

use crashmeta_internals::StripedMap;
use triomphe::Arc;

use crate::AttributeError;

/// A live, read-only view of a store's custom attributes.
///
/// The view shares storage with the [`AttributeStore`] that created it rather
/// than copying it: attributes written after the view was obtained show up
/// through it, and it stays valid even if the store itself is dropped.
/// Cloning a view is cheap and yields another view of the same storage.
///
/// Every read locks at most one shard at a time and copies whole entries out,
/// so a reader never sees a half-written value. Reads that visit the whole
/// map ([`iter`](Self::iter), [`to_map`](Self::to_map)) are not a consistent
/// cut with respect to concurrent writers.
///
/// There is no way to write through a view. [`try_insert`](Self::try_insert)
/// and [`try_remove`](Self::try_remove) exist for callers that treat the view
/// as a general map, and always fail with
/// [`AttributeError::UnsupportedMutation`].
///
/// # Examples
///
/// ```
/// use crashmeta::{AttributeError, AttributeStore};
///
/// let store = AttributeStore::new();
/// let keys = store.custom_keys();
/// assert!(keys.is_empty());
///
/// store.set_custom_key("build", "1.2.3")?;
/// assert_eq!(keys.get("build").as_deref(), Some("1.2.3"));
///
/// assert_eq!(
///     keys.try_insert("build", "4.5.6"),
///     Err(AttributeError::UnsupportedMutation)
/// );
/// # Ok::<(), AttributeError>(())
/// ```
///
/// [`AttributeStore`]: crate::AttributeStore
#[derive(Clone)]
pub struct CustomKeys {
    map: Arc<StripedMap>,
}

impl CustomKeys {
    pub(crate) fn new(map: Arc<StripedMap>) -> Self {
        Self { map }
    }

    /// Returns a copy of the value stored under `key`.
    ///
    /// `key` is looked up as given; it is not sanitized first.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        self.map.get(key)
    }

    /// Returns `true` if `key` is present.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.map.contains_key(key)
    }

    /// Number of attributes currently stored.
    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns `true` if no attributes are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Calls `f` for every attribute without copying it.
    ///
    /// `f` must not write to the store this view came from; the shard being
    /// visited is read-locked for the duration of the call.
    pub fn for_each(&self, f: impl FnMut(&str, &str)) {
        self.map.for_each(f);
    }

    /// Iterates over a copy of the attributes taken when this is called.
    ///
    /// Iteration order is unspecified.
    pub fn iter(&self) -> vec::IntoIter<(String, String)> {
        self.map.snapshot().into_iter()
    }

    /// Copies the attributes into a sorted map.
    #[must_use]
    pub fn to_map(&self) -> BTreeMap<String, String> {
        self.map.snapshot().into_iter().collect()
    }

    /// Always fails: the view is read-only.
    ///
    /// Use [`AttributeStore::set_custom_key`] to write attributes.
    ///
    /// [`AttributeStore::set_custom_key`]: crate::AttributeStore::set_custom_key
    pub fn try_insert(&self, _key: &str, _value: &str) -> Result<(), AttributeError> {
        Err(AttributeError::UnsupportedMutation)
    }

    /// Always fails: the view is read-only.
    pub fn try_remove(&self, _key: &str) -> Result<Option<String>, AttributeError> {
        Err(AttributeError::UnsupportedMutation)
    }
}

impl fmt::Debug for CustomKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.map, f)
    }
}

impl IntoIterator for &CustomKeys {
    type Item = (String, String);
    type IntoIter = vec::IntoIter<(String, String)>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use super::*;

    #[test]
    fn test_custom_keys_send_sync() {
        static_assertions::assert_impl_all!(CustomKeys: Send, Sync, Clone);
    }

    #[test]
    fn test_view_shares_storage() {
        let map = Arc::new(StripedMap::new());
        let view = CustomKeys::new(Arc::clone(&map));
        let copy = view.clone();

        map.insert("k".to_string(), "v".to_string());
        assert_eq!(view.get("k").as_deref(), Some("v"));
        assert_eq!(copy.len(), 1);
        assert_eq!(view.to_map().get("k").map(String::as_str), Some("v"));
    }

    #[test]
    fn test_view_rejects_writes() {
        let map = Arc::new(StripedMap::new());
        map.insert("k".to_string(), "v".to_string());
        let view = CustomKeys::new(map);

        assert_eq!(
            view.try_insert("x", "y"),
            Err(AttributeError::UnsupportedMutation)
        );
        assert_eq!(view.try_remove("k"), Err(AttributeError::UnsupportedMutation));
        assert_eq!(view.len(), 1);
        assert!(!view.contains_key("x"));
    }
}

//! Reporting of capacity rejections.
//!
//! A write that would grow an [`AttributeStore`] past
//! [`Limits::max_attributes`] is not an error: the call returns `Ok(())` and
//! the store hands a [`CapacityExceeded`] event to its [`CapacityHook`]
//! instead. Unless configured otherwise that hook is [`TracingLogger`], which
//! emits one `TRACE`-level event through [`tracing`].
//!
//! # Examples
//!
//! Counting rejections instead of logging them:
//!
//! ```
//! use std::sync::{
//!     Arc,
//!     atomic::{AtomicUsize, Ordering},
//! };
//!
//! use crashmeta::{AttributeStore, hooks::CapacityExceeded};
//!
//! let rejected = Arc::new(AtomicUsize::new(0));
//! let counter = Arc::clone(&rejected);
//!
//! let store = AttributeStore::builder()
//!     .max_attributes(1)
//!     .capacity_hook(move |event: &CapacityExceeded| {
//!         counter.fetch_add(event.rejected, Ordering::Relaxed);
//!     })
//!     .build();
//!
//! store.set_custom_key("first", "1")?;
//! store.set_custom_key("second", "2")?;
//! assert_eq!(rejected.load(Ordering::Relaxed), 1);
//! # Ok::<(), crashmeta::AttributeError>(())
//! ```
//!
//! [`AttributeStore`]: crate::AttributeStore
//! [`Limits::max_attributes`]: crate::Limits::max_attributes

use core::fmt;

/// Describes a write that was refused because the store was full.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub struct CapacityExceeded {
    /// The limit that would have been exceeded.
    pub max_attributes: usize,
    /// Number of attributes in the store when the write was refused.
    pub current_len: usize,
    /// Number of new keys that were refused. Always 1 for
    /// [`set_custom_key`](crate::AttributeStore::set_custom_key); the size
    /// of the new-key batch for
    /// [`set_custom_keys`](crate::AttributeStore::set_custom_keys).
    pub rejected: usize,
}

impl CapacityExceeded {
    pub(crate) fn new(max_attributes: usize, current_len: usize, rejected: usize) -> Self {
        Self {
            max_attributes,
            current_len,
            rejected,
        }
    }
}

impl fmt::Display for CapacityExceeded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Exceeded maximum number of custom attributes ({})",
            self.max_attributes
        )
    }
}

/// Receives every capacity rejection of the store it is installed on.
///
/// Implemented for any `Fn(&CapacityExceeded) + Send + Sync + 'static`.
/// Hooks run on the thread that made the rejected call and should return
/// quickly.
pub trait CapacityHook: 'static + Send + Sync {
    /// Called once per rejected `set_custom_key` or `set_custom_keys` call.
    fn on_capacity_exceeded(&self, event: &CapacityExceeded);
}

impl<F> CapacityHook for F
where
    F: Fn(&CapacityExceeded) + 'static + Send + Sync,
{
    fn on_capacity_exceeded(&self, event: &CapacityExceeded) {
        self(event)
    }
}

/// The default [`CapacityHook`]: logs each rejection at `TRACE` level.
///
/// The event message is the [`Display`](fmt::Display) form of
/// [`CapacityExceeded`], e.g.
/// `Exceeded maximum number of custom attributes (64)`, with the `current_len`
/// and `rejected` counts attached as fields.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogger;

impl CapacityHook for TracingLogger {
    fn on_capacity_exceeded(&self, event: &CapacityExceeded) {
        tracing::trace!(
            current_len = event.current_len,
            rejected = event.rejected,
            "{event}"
        );
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;
    use core::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[test]
    fn test_capacity_message() {
        let event = CapacityExceeded::new(64, 64, 1);
        assert_eq!(
            event.to_string(),
            "Exceeded maximum number of custom attributes (64)"
        );
    }

    #[test]
    fn test_closure_hook() {
        static SEEN: AtomicUsize = AtomicUsize::new(0);

        let hook = |event: &CapacityExceeded| {
            SEEN.fetch_add(event.rejected, Ordering::Relaxed);
        };
        hook.on_capacity_exceeded(&CapacityExceeded::new(2, 2, 3));
        assert_eq!(SEEN.load(Ordering::Relaxed), 3);
    }

    #[test]
    fn test_hooks_send_sync() {
        static_assertions::assert_impl_all!(TracingLogger: CapacityHook, Send, Sync);
        static_assertions::assert_obj_safe!(CapacityHook);
    }
}

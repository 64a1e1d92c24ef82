//! A reader-writer lock that never reports poisoning.
//!
//! With the `std` feature this is `std::sync::RwLock`, otherwise
//! `spin::RwLock`. Poisoning is ignored: everything stored behind these locks
//! is replaced wholesale, so a panic in another thread cannot leave a value
//! half-written.

#[cfg(feature = "std")]
use std::sync as impl_;

#[cfg(not(feature = "std"))]
use spin as impl_;

/// A reader-writer lock over `T`.
#[repr(transparent)]
pub struct RwLock<T>(impl_::RwLock<T>);

/// Shared guard returned by [`RwLock::read`].
pub type ReadGuard<'a, T> = impl_::RwLockReadGuard<'a, T>;

/// Exclusive guard returned by [`RwLock::write`].
pub type WriteGuard<'a, T> = impl_::RwLockWriteGuard<'a, T>;

impl<T> RwLock<T> {
    /// Wraps `value` in a new, unlocked lock.
    #[must_use]
    pub const fn new(value: T) -> Self {
        Self(impl_::RwLock::new(value))
    }

    /// Acquires shared access.
    #[inline]
    pub fn read(&self) -> ReadGuard<'_, T> {
        #[cfg(not(feature = "std"))]
        let guard = self.0.read();

        #[cfg(feature = "std")]
        let guard = self.0.read().unwrap_or_else(std::sync::PoisonError::into_inner);

        guard
    }

    /// Acquires exclusive access.
    #[inline]
    pub fn write(&self) -> WriteGuard<'_, T> {
        #[cfg(not(feature = "std"))]
        let guard = self.0.write();

        #[cfg(feature = "std")]
        let guard = self
            .0
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);

        guard
    }
}

impl<T: Default> Default for RwLock<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lock_send_sync() {
        static_assertions::assert_impl_all!(RwLock<usize>: Send, Sync);
    }

    #[test]
    fn test_read_after_write() {
        let lock = RwLock::new(1_u32);
        *lock.write() += 1;
        assert_eq!(*lock.read(), 2);
    }
}

//! The error type returned by fallible attribute operations.
//!
//! Capacity rejections are deliberately absent from this type: a write that
//! would exceed [`Limits::max_attributes`] is reported through the store's
//! [`CapacityHook`] and the call still returns `Ok(())`.
//!
//! [`Limits::max_attributes`]: crate::Limits::max_attributes
//! [`CapacityHook`]: crate::hooks::CapacityHook

use core::fmt;

/// Errors produced by [`AttributeStore`] and [`CustomKeys`].
///
/// [`AttributeStore`]: crate::AttributeStore
/// [`CustomKeys`]: crate::CustomKeys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum AttributeError {
    /// A custom attribute key was `None`.
    ///
    /// Returned by [`AttributeStore::set_custom_key`], and by
    /// [`AttributeStore::set_custom_keys`] if any entry of the batch has a
    /// `None` key. In both cases the map is left untouched.
    ///
    /// [`AttributeStore::set_custom_key`]: crate::AttributeStore::set_custom_key
    /// [`AttributeStore::set_custom_keys`]: crate::AttributeStore::set_custom_keys
    InvalidArgument,

    /// A write was attempted through the read-only [`CustomKeys`] view.
    ///
    /// [`CustomKeys`]: crate::CustomKeys
    UnsupportedMutation,
}

impl fmt::Display for AttributeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidArgument => write!(f, "Custom attribute key must not be null."),
            Self::UnsupportedMutation => write!(f, "custom key view is read-only"),
        }
    }
}

impl core::error::Error for AttributeError {}

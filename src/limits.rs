//! Size limits enforced by an [`AttributeStore`].
//!
//! [`AttributeStore`]: crate::AttributeStore

use crate::sanitize;

/// The two bounds every [`AttributeStore`] enforces.
///
/// Each store carries its own copy, so stores for different sessions can be
/// configured independently. [`Limits::default()`] gives the standard bounds
/// of [`MAX_ATTRIBUTES`] entries of at most [`MAX_ATTRIBUTE_SIZE`] UTF-16 code
/// units each.
///
/// # Examples
///
/// ```
/// use crashmeta::Limits;
///
/// let limits = Limits::default();
/// assert_eq!(limits.max_attributes, 64);
/// assert_eq!(limits.max_attribute_size, 1024);
///
/// assert_eq!(limits.sanitize(Some("  user  ")), Some("user"));
/// ```
///
/// [`AttributeStore`]: crate::AttributeStore
/// [`MAX_ATTRIBUTES`]: Limits::MAX_ATTRIBUTES
/// [`MAX_ATTRIBUTE_SIZE`]: Limits::MAX_ATTRIBUTE_SIZE
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Limits {
    /// Maximum number of custom attributes a store admits.
    pub max_attributes: usize,
    /// Maximum length, in UTF-16 code units, of any key, value or user id.
    pub max_attribute_size: usize,
}

impl Limits {
    /// Default maximum number of custom attributes.
    pub const MAX_ATTRIBUTES: usize = 64;

    /// Default maximum attribute length in UTF-16 code units.
    pub const MAX_ATTRIBUTE_SIZE: usize = 1024;

    /// The default limits as a constant.
    pub const DEFAULT: Self = Self::new(Self::MAX_ATTRIBUTES, Self::MAX_ATTRIBUTE_SIZE);

    /// Creates a new set of limits.
    #[must_use]
    pub const fn new(max_attributes: usize, max_attribute_size: usize) -> Self {
        Self {
            max_attributes,
            max_attribute_size,
        }
    }

    /// Sanitizes `input` against [`max_attribute_size`](Self::max_attribute_size).
    ///
    /// See [`sanitize::sanitize_attribute`].
    #[must_use]
    pub fn sanitize<'a>(&self, input: Option<&'a str>) -> Option<&'a str> {
        sanitize::sanitize_attribute(input, self.max_attribute_size)
    }
}

impl Default for Limits {
    fn default() -> Self {
        Self::DEFAULT
    }
}

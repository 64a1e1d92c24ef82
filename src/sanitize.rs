//! Trimming and truncation applied to every key, value and user id.
//!
//! Sanitizing never allocates: both steps only narrow the input, so every
//! function here returns a subslice of its argument.
//!
//! Two details differ from what `str::trim` and byte slicing would give:
//!
//! - Whitespace is anything up to and including `U+0020`, i.e. the space
//!   character and the ASCII control characters. Unicode spaces such as
//!   `U+00A0` are kept.
//! - Lengths are counted in UTF-16 code units. A character outside the Basic
//!   Multilingual Plane counts as two, and if it would straddle the limit it
//!   is dropped whole, so the result can be one unit shorter than the limit.
//!
//! # Examples
//!
//! ```
//! use crashmeta::sanitize::{sanitize_attribute, sanitize_key};
//!
//! assert_eq!(sanitize_attribute(Some("\t hello \n"), 1024), Some("hello"));
//! assert_eq!(sanitize_attribute(Some("abcdef"), 3), Some("abc"));
//! assert_eq!(sanitize_attribute(None, 1024), None);
//! assert!(sanitize_key(None, 1024).is_err());
//! ```

use crate::AttributeError;

/// Removes leading and trailing characters `<= U+0020`.
#[must_use]
pub fn trim(input: &str) -> &str {
    input.trim_matches(|c: char| c <= ' ')
}

/// Length of `input` in UTF-16 code units.
#[must_use]
pub fn utf16_len(input: &str) -> usize {
    input.chars().map(char::len_utf16).sum()
}

/// Cuts `input` down to at most `max_units` UTF-16 code units.
#[must_use]
pub fn truncate(input: &str, max_units: usize) -> &str {
    // A UTF-8 string never has fewer bytes than UTF-16 code units.
    if input.len() <= max_units {
        return input;
    }

    let mut units = 0;
    for (index, c) in input.char_indices() {
        units += c.len_utf16();
        if units > max_units {
            return &input[..index];
        }
    }
    input
}

/// Trims `input`, then truncates it to `max_units` UTF-16 code units.
///
/// `None` passes through unchanged.
#[must_use]
pub fn sanitize_attribute(input: Option<&str>, max_units: usize) -> Option<&str> {
    input.map(|input| truncate(trim(input), max_units))
}

/// Like [`sanitize_attribute`], but a missing key is an error.
pub fn sanitize_key(key: Option<&str>, max_units: usize) -> Result<&str, AttributeError> {
    let key = key.ok_or(AttributeError::InvalidArgument)?;
    Ok(truncate(trim(key), max_units))
}

#[cfg(test)]
mod tests {
    use alloc::string::String;

    use super::*;

    #[test]
    fn test_trim_matches_ascii_control_and_space() {
        assert_eq!(trim("  bob  "), "bob");
        assert_eq!(trim("\u{0}\t\r\nbob\u{1f}"), "bob");
        assert_eq!(trim("   "), "");
        // Non-breaking space is above U+0020 and survives.
        assert_eq!(trim("\u{a0}bob\u{a0}"), "\u{a0}bob\u{a0}");
        assert_eq!(trim("a b"), "a b");
    }

    #[test]
    fn test_truncate_ascii() {
        let long: String = core::iter::repeat_n('x', 1500).collect();
        let truncated = truncate(&long, 1024);
        assert_eq!(truncated.len(), 1024);
        assert_eq!(truncated, &long[..1024]);

        assert_eq!(truncate("short", 1024), "short");
        assert_eq!(truncate("exact", 5), "exact");
        assert_eq!(truncate("anything", 0), "");
    }

    #[test]
    fn test_truncate_counts_utf16_units() {
        // 'é' is one UTF-16 unit but two UTF-8 bytes.
        let accented: String = core::iter::repeat_n('é', 10).collect();
        assert_eq!(utf16_len(&accented), 10);
        assert_eq!(truncate(&accented, 10), accented);
        assert_eq!(utf16_len(truncate(&accented, 4)), 4);
    }

    #[test]
    fn test_truncate_drops_straddling_surrogate_pair() {
        // 'a' + U+1F600 is three UTF-16 units.
        let input = "a\u{1f600}b";
        assert_eq!(utf16_len(input), 4);
        assert_eq!(truncate(input, 2), "a");
        assert_eq!(truncate(input, 3), "a\u{1f600}");
    }

    #[test]
    fn test_sanitize_trims_before_truncating() {
        assert_eq!(sanitize_attribute(Some("   abcdef"), 3), Some("abc"));
        assert_eq!(sanitize_attribute(Some(""), 3), Some(""));
        assert_eq!(sanitize_attribute(None, 3), None);
    }

    #[test]
    fn test_sanitize_key_rejects_none() {
        assert_eq!(sanitize_key(None, 10), Err(AttributeError::InvalidArgument));
        assert_eq!(sanitize_key(Some(" k "), 10), Ok("k"));
    }
}

//! Key normalization for sector names and other free-text labels
//!
//! Produces the canonical lookup key used by the configuration cache and by
//! the access policy allow-list:
//! - Lowercase conversion
//! - All whitespace removed
//! - Unicode NFD decomposition with combining diacritics (U+0300..=U+036F) removed
//!
//! Two labels that normalize to the same key are the same sector as far as
//! caching and authorization are concerned. `NormalizedKey` can only be built
//! through [`normalize`], so cache keys and policy keys cannot drift apart.

use std::fmt;

use serde::{Serialize, Serializer};
use unicode_normalization::UnicodeNormalization;

/// Combining Diacritical Marks block
const COMBINING_MARKS: std::ops::RangeInclusive<char> = '\u{0300}'..='\u{036F}';

/// Canonical lookup key produced by [`normalize`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct NormalizedKey(String);

impl NormalizedKey {
    /// Normalize a raw label into a key. Same as [`normalize`].
    pub fn new(raw: &str) -> Self {
        normalize(raw)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Check whether a raw label normalizes to this key
    pub fn matches(&self, raw: &str) -> bool {
        normalize(raw) == *self
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for NormalizedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NormalizedKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Serialize for NormalizedKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

/// Normalize a label into its canonical key.
///
/// Total and pure: every input, including the empty string, yields a key.
///
/// # Examples
///
/// ```
/// use maint_registry::normalize::normalize;
///
/// assert_eq!(normalize("Laboratório de Ensaios Elétricos").as_str(), "laboratoriodeensaioseletricos");
/// assert_eq!(normalize("  Bobinagem ").as_str(), "bobinagem");
/// ```
pub fn normalize(raw: &str) -> NormalizedKey {
    // Whitespace goes before decomposition: dropping a starter between two
    // runs of combining marks would leave them out of canonical order.
    let compact: String = raw
        .to_lowercase()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();

    let key: String = compact
        .nfd()
        .filter(|c| !COMBINING_MARKS.contains(c))
        .collect();

    NormalizedKey(key)
}

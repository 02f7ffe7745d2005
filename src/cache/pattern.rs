//! Key Pattern Module
//!
//! Predicates over cache keys used for bulk invalidation.

use std::fmt;
use std::sync::Arc;

use regex::Regex;

use crate::error::Result;

// == Key Pattern ==
/// Selects the keys removed by `invalidate`.
#[derive(Clone)]
pub enum KeyPattern {
    /// Matches keys containing the literal text
    Substring(String),
    /// Matches keys starting with the literal text
    Prefix(String),
    /// Matches keys the compiled expression finds a match in
    Regex(Regex),
    /// Arbitrary predicate over the key
    Predicate(Arc<dyn Fn(&str) -> bool + Send + Sync>),
}

impl KeyPattern {
    pub fn substring(text: impl Into<String>) -> Self {
        KeyPattern::Substring(text.into())
    }

    pub fn prefix(text: impl Into<String>) -> Self {
        KeyPattern::Prefix(text.into())
    }

    /// Compiles `pattern` as a regular expression.
    ///
    /// A malformed pattern is returned as `CacheError::InvalidPattern`.
    pub fn regex(pattern: &str) -> Result<Self> {
        Ok(KeyPattern::Regex(Regex::new(pattern)?))
    }

    pub fn predicate<F>(f: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        KeyPattern::Predicate(Arc::new(f))
    }

    /// Returns true if `key` is selected by this pattern.
    pub fn matches(&self, key: &str) -> bool {
        match self {
            KeyPattern::Substring(text) => key.contains(text.as_str()),
            KeyPattern::Prefix(text) => key.starts_with(text.as_str()),
            KeyPattern::Regex(re) => re.is_match(key),
            KeyPattern::Predicate(f) => f(key),
        }
    }
}

impl fmt::Debug for KeyPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyPattern::Substring(text) => f.debug_tuple("Substring").field(text).finish(),
            KeyPattern::Prefix(text) => f.debug_tuple("Prefix").field(text).finish(),
            KeyPattern::Regex(re) => f.debug_tuple("Regex").field(&re.as_str()).finish(),
            KeyPattern::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

impl From<&str> for KeyPattern {
    fn from(text: &str) -> Self {
        KeyPattern::substring(text)
    }
}

impl From<String> for KeyPattern {
    fn from(text: String) -> Self {
        KeyPattern::Substring(text)
    }
}

impl From<Regex> for KeyPattern {
    fn from(re: Regex) -> Self {
        KeyPattern::Regex(re)
    }
}

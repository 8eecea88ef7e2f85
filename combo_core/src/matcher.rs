//! Name matching strategies for incompatibility patterns
//!
//! Actions declare incompatibility as a set of patterns matched against
//! other actions' names. The matching strategy is injected into the
//! generator through the [`NameMatcher`] trait, so a profile can choose
//! between exact names, shell-style globs, or full regular expressions
//! without touching the enumeration logic.

use std::collections::HashMap;
use std::sync::RwLock;

use regex::Regex;

use crate::errors::{ComboError, ComboResult};

/// Strategy for matching an incompatibility pattern against an action name
///
/// `matches` must be pure with respect to its arguments; implementations
/// may cache compiled patterns internally. `validate` is called once per
/// declared pattern at generation start, so a malformed pattern is a fatal
/// configuration error rather than a silent non-match.
pub trait NameMatcher: Send + Sync {
    /// Whether `pattern` matches the full action name `name`
    fn matches(&self, pattern: &str, name: &str) -> bool;

    /// Check pattern syntax; the default accepts everything
    fn validate(&self, _pattern: &str) -> ComboResult<()> {
        Ok(())
    }
}

/// Exact-name matching: a pattern matches only the identical name
#[derive(Debug, Default)]
pub struct ExactMatcher;

impl NameMatcher for ExactMatcher {
    fn matches(&self, pattern: &str, name: &str) -> bool {
        pattern == name
    }
}

/// Regular-expression matching, anchored to the whole name
///
/// Patterns are compiled on first use and cached. This is the generator's
/// default strategy.
#[derive(Debug, Default)]
pub struct RegexMatcher {
    cache: RwLock<HashMap<String, Regex>>,
}

impl RegexMatcher {
    /// Create a matcher with an empty pattern cache
    pub fn new() -> Self {
        RegexMatcher::default()
    }

    fn compiled(&self, pattern: &str) -> Option<Regex> {
        if let Some(re) = self.cache.read().ok()?.get(pattern) {
            return Some(re.clone());
        }
        let anchored = format!("^(?:{pattern})$");
        let re = Regex::new(&anchored).ok()?;
        if let Ok(mut cache) = self.cache.write() {
            cache.insert(pattern.to_string(), re.clone());
        }
        Some(re)
    }
}

impl NameMatcher for RegexMatcher {
    fn matches(&self, pattern: &str, name: &str) -> bool {
        self.compiled(pattern)
            .map(|re| re.is_match(name))
            .unwrap_or(false)
    }

    fn validate(&self, pattern: &str) -> ComboResult<()> {
        Regex::new(&format!("^(?:{pattern})$")).map_err(|e| {
            ComboError::configuration(format!("invalid incompatibility pattern '{pattern}': {e}"))
        })?;
        Ok(())
    }
}

/// Shell-style glob matching: `*` matches any run, `?` a single character
///
/// Globs are translated to anchored regular expressions and share the
/// [`RegexMatcher`] cache machinery.
#[derive(Debug, Default)]
pub struct GlobMatcher {
    inner: RegexMatcher,
}

impl GlobMatcher {
    /// Create a matcher with an empty pattern cache
    pub fn new() -> Self {
        GlobMatcher::default()
    }

    fn translate(pattern: &str) -> String {
        let mut out = String::with_capacity(pattern.len() * 2);
        for c in pattern.chars() {
            match c {
                '*' => out.push_str(".*"),
                '?' => out.push('.'),
                c => out.push_str(&regex::escape(&c.to_string())),
            }
        }
        out
    }
}

impl NameMatcher for GlobMatcher {
    fn matches(&self, pattern: &str, name: &str) -> bool {
        self.inner.matches(&Self::translate(pattern), name)
    }

    fn validate(&self, pattern: &str) -> ComboResult<()> {
        self.inner.validate(&Self::translate(pattern))
    }
}

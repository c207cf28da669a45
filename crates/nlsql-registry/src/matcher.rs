//! Text recognition for pattern rules

use regex::{Regex, RegexBuilder};
use std::fmt;

/// Recognizes one phrasing of an intent and captures its free variables.
pub trait Matcher: fmt::Debug + Send + Sync {
    /// Captured substrings, in order, when `text` is recognized.
    ///
    /// Optional captures that did not participate come back as empty strings
    /// so templates can index captures positionally.
    fn recognize(&self, text: &str) -> Option<Vec<String>>;
}

/// Case-insensitive, unanchored regex matcher.
///
/// Unicode mode is off, so `\d` and `\w` only match ASCII and captures always
/// fit the SQL grammar's number and identifier tokens.
pub struct RegexMatcher {
    pattern: Regex,
}

impl RegexMatcher {
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        let pattern = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .unicode(false)
            .build()?;
        Ok(Self { pattern })
    }

    pub fn as_str(&self) -> &str {
        self.pattern.as_str()
    }
}

impl fmt::Debug for RegexMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RegexMatcher").field(&self.pattern.as_str()).finish()
    }
}

impl Matcher for RegexMatcher {
    fn recognize(&self, text: &str) -> Option<Vec<String>> {
        let caps = self.pattern.captures(text)?;
        Some(
            caps.iter()
                .skip(1)
                .map(|m| m.map(|m| m.as_str().to_string()).unwrap_or_default())
                .collect(),
        )
    }
}

//! Ready-made [`Matcher`] implementations.
//!
//! A filter can be a closure, a regex, an exact base name, or a list of any
//! of these (which matches when any member does).

use regex::Regex;

use crate::entry::Entry;
use crate::traits::Matcher;

/// Matches entries whose base name equals the given string exactly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Name(pub String);

impl Name {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}

impl Matcher for Name {
    fn is_match(&self, entry: &Entry) -> bool {
        entry.name() == self.0
    }
}

/// Tested against the entry's path relative to base, with `/` separators on
/// every platform.
impl Matcher for Regex {
    fn is_match(&self, entry: &Entry) -> bool {
        let rel = entry.relative().to_string_lossy();
        if std::path::MAIN_SEPARATOR == '/' {
            Regex::is_match(self, &rel)
        } else {
            Regex::is_match(self, &rel.replace(std::path::MAIN_SEPARATOR, "/"))
        }
    }
}

impl<F> Matcher for F
where
    F: Fn(&Entry) -> bool + Send + Sync,
{
    fn is_match(&self, entry: &Entry) -> bool {
        self(entry)
    }
}

/// Matches when any member matches. An empty list matches nothing.
pub struct AnyOf(Vec<Box<dyn Matcher>>);

impl AnyOf {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Add another alternative.
    pub fn or(mut self, m: impl Matcher + 'static) -> Self {
        self.0.push(Box::new(m));
        self
    }
}

impl Default for AnyOf {
    fn default() -> Self {
        Self::new()
    }
}

impl Matcher for AnyOf {
    fn is_match(&self, entry: &Entry) -> bool {
        self.0.iter().any(|m| m.is_match(entry))
    }
}

impl<M: Matcher> Matcher for Vec<M> {
    fn is_match(&self, entry: &Entry) -> bool {
        self.iter().any(|m| m.is_match(entry))
    }
}

//! Ordered, duplicate-free set of PO entry flags (`#, fuzzy, c-format`).

use std::fmt;

/// An ordered set of unique, non-empty flag names.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Flags(Vec<String>);

impl Flags {
    pub fn new() -> Self {
        Flags(Vec::new())
    }

    /// Replaces the contents by splitting `text` on `,`, trimming whitespace,
    /// and dropping empty or repeated entries (first occurrence wins order).
    pub fn parse(&mut self, text: &str) {
        let mut out = Vec::new();
        for tag in text.split(',') {
            let tag = tag.trim();
            if !tag.is_empty() && !out.iter().any(|existing: &String| existing == tag) {
                out.push(tag.to_string());
            }
        }
        self.0 = out;
    }

    pub fn contains(&self, flag: &str) -> bool {
        self.0.iter().any(|f| f == flag)
    }

    /// Adds `flag` if absent. Returns `false` if it was already present.
    pub fn add(&mut self, flag: impl Into<String>) -> bool {
        let flag = flag.into();
        if self.contains(&flag) {
            return false;
        }
        self.0.push(flag);
        true
    }

    /// Removes `flag` if present. Returns `false` if it was absent.
    pub fn remove(&mut self, flag: &str) -> bool {
        if let Some(idx) = self.0.iter().position(|f| f == flag) {
            self.0.remove(idx);
            true
        } else {
            false
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl fmt::Display for Flags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_strips_empty_and_duplicate_entries() {
        let cases = [
            ("", ""),
            ("foo, bar", "foo, bar"),
            ("  foo, \nbar  ", "foo, bar"),
            ("foo, foo", "foo"),
        ];
        let mut flags = Flags::new();
        for (source, want) in cases {
            flags.parse(source);
            assert_eq!(flags.to_string(), want);
        }
    }

    #[test]
    fn add_contains_remove() {
        let mut flags = Flags::new();
        assert!(!flags.contains("foo"));
        assert!(flags.add("foo"));
        assert!(flags.add("bar"));
        assert!(flags.contains("foo"));
        assert!(flags.contains("bar"));
        assert!(!flags.add("bar"));
        assert!(flags.remove("foo"));
        assert!(!flags.contains("foo"));
        assert!(flags.contains("bar"));
        assert!(!flags.remove("foo"));
    }
}

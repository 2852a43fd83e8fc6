//! [`Starter`] answers: does this line begin a block of a given `(border,
//! prefix)` kind? A [`crate::scanner::Scanner`] carries an ordered list of
//! starters and uses the first one that matches.

use regex::Regex;

/// Recognizes whether a line begins a block, and if so, its border and prefix.
pub trait Starter: Send + Sync {
    /// Returns `(border, prefix)` if `line` begins a block of this starter's kind.
    fn extract(&self, line: &str) -> Option<(String, String)>;
}

/// Matches the literal concatenation `border` + `prefix`.
pub struct PlainStarter {
    border: String,
    prefix: String,
}

impl PlainStarter {
    pub fn new(border: impl Into<String>, prefix: impl Into<String>) -> Self {
        PlainStarter {
            border: border.into(),
            prefix: prefix.into(),
        }
    }
}

impl Starter for PlainStarter {
    fn extract(&self, line: &str) -> Option<(String, String)> {
        if self.border.is_empty() && self.prefix.is_empty() {
            return None;
        }
        let needle = format!("{}{}", self.border, self.prefix);
        if line.starts_with(&needle) {
            Some((self.border.clone(), self.prefix.clone()))
        } else {
            None
        }
    }
}

/// Matches `^(border)(prefix)` where `border`/`prefix` are regex fragments,
/// e.g. `msgstr\[\d+\] `. Captures the matched border/prefix text.
pub struct RegexpStarter {
    matcher: Regex,
}

impl RegexpStarter {
    pub fn new(border: &str, prefix: &str) -> Self {
        let pattern = format!("^({border})({prefix})");
        let matcher = Regex::new(&pattern).expect("starter pattern must compile");
        RegexpStarter { matcher }
    }
}

impl Starter for RegexpStarter {
    fn extract(&self, line: &str) -> Option<(String, String)> {
        let caps = self.matcher.captures(line)?;
        Some((caps[1].to_string(), caps[2].to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_starter_matches_prefix() {
        let s = PlainStarter::new("#| ", "msgid ");
        let (border, prefix) = s.extract(r#"#| msgid "Some short text""#).unwrap();
        assert_eq!(border, "#| ");
        assert_eq!(prefix, "msgid ");
        assert!(s.extract(r#"# msgid "Some short text""#).is_none());
    }

    #[test]
    fn regexp_starter_matches_plural_index() {
        let s = RegexpStarter::new(r"#\| ", r"msgstr\[\d+\] ");
        let (border, prefix) = s.extract(r#"#| msgstr[12] "Some short text""#).unwrap();
        assert_eq!(border, "#| ");
        assert_eq!(prefix, "msgstr[12] ");
        assert!(s.extract(r#"# msgstr[12] "Some short text""#).is_none());
    }

    #[test]
    fn empty_plain_starter_never_matches() {
        let s = PlainStarter::new("", "");
        assert!(s.extract("anything").is_none());
    }
}

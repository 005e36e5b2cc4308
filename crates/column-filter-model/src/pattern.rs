use regex::{Regex, RegexBuilder};
use serde::{Serialize, Serializer};
use std::hash::{Hash, Hasher};
use thiserror::Error;

/// Characters escaped when building a canonical pattern.
const METACHARACTERS: &[char] = &[
    '-', '[', ']', '/', '{', '}', '(', ')', '*', '+', '?', '.', '\\', '^', '$', '|',
];

#[derive(Debug, Error)]
pub enum PatternError {
    #[error("filter pattern {canonical:?} could not be compiled: {source}")]
    Compile {
        canonical: String,
        #[source]
        source: regex::Error,
    },
}

/// Escape every regex metacharacter in `text` with a backslash.
pub fn escape_pattern_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        if METACHARACTERS.contains(&ch) {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

/// Canonical form of filter text: escaped, then lower-cased.
pub fn canonicalize(text: &str) -> String {
    escape_pattern_text(text).to_lowercase()
}

/// A case-insensitive substring pattern built from literal text.
///
/// Two patterns are equal iff their canonical text is equal; the compiled matcher and the
/// original source text do not take part in equality.
#[derive(Clone, Debug)]
pub struct FilterPattern {
    source: String,
    canonical: String,
    matcher: Regex,
}

impl FilterPattern {
    pub fn new(text: &str) -> Result<Self, PatternError> {
        let canonical = canonicalize(text);
        // An unanchored search is equivalent to `.*(text).*`. Both sides are lower-cased with
        // the same mapping, so the matcher itself stays case-sensitive.
        let matcher = RegexBuilder::new(&regex::escape(&text.to_lowercase()))
            .build()
            .map_err(|source| PatternError::Compile {
                canonical: canonical.clone(),
                source,
            })?;
        Ok(Self {
            source: text.to_string(),
            canonical,
            matcher,
        })
    }

    /// The text the pattern was built from.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The escaped, lower-cased text used for equality.
    pub fn canonical(&self) -> &str {
        &self.canonical
    }

    /// Returns true if the lower-cased `text` contains the pattern.
    pub fn is_match(&self, text: &str) -> bool {
        self.matcher.is_match(&text.to_lowercase())
    }

    /// Returns true if this pattern was built from text equivalent to `text`.
    pub fn matches_source(&self, text: &str) -> bool {
        self.canonical == canonicalize(text)
    }
}

impl PartialEq for FilterPattern {
    fn eq(&self, other: &Self) -> bool {
        self.canonical == other.canonical
    }
}

impl Eq for FilterPattern {}

impl Hash for FilterPattern {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical.hash(state);
    }
}

impl Serialize for FilterPattern {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.canonical)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn canonical_text_escapes_metacharacters_and_lowercases() {
        assert_eq!(canonicalize("A.B (c)"), r"a\.b \(c\)");
        assert_eq!(canonicalize("x-y/z|$^"), r"x\-y\/z\|\$\^");
        assert_eq!(canonicalize(r"[a]{b}*+?\"), r"\[a\]\{b\}\*\+\?\\");
    }

    #[test]
    fn matches_substrings_case_insensitively() {
        let p = FilterPattern::new("AN").unwrap();
        assert!(p.is_match("Amanda"));
        assert!(p.is_match("ANNA"));
        assert!(!p.is_match("Bob"));
    }

    #[test]
    fn metacharacters_match_literally() {
        let p = FilterPattern::new("a.c").unwrap();
        assert!(p.is_match("xA.Cx"));
        assert!(!p.is_match("abc"));

        let p = FilterPattern::new("(1+1)").unwrap();
        assert!(p.is_match("sum (1+1) = 2"));
        assert!(!p.is_match("11"));
    }

    #[test]
    fn value_matches_itself_when_lowercase_changes_length() {
        // 'İ' lower-cases to "i\u{307}", two chars.
        let p = FilterPattern::new("İstanbul").unwrap();
        assert_eq!("İ".to_lowercase().chars().count(), 2);
        assert!(p.is_match("İstanbul"));
        assert!(p.is_match("İSTANBUL"));
        assert!(!p.is_match("Oslo"));
    }

    #[test]
    fn equality_uses_canonical_text() {
        let a = FilterPattern::new("Bob").unwrap();
        let b = FilterPattern::new("bOB").unwrap();
        let c = FilterPattern::new("Bo").unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.source(), "Bob");
        assert!(a.matches_source("BOB"));
    }

    #[test]
    fn empty_pattern_matches_everything() {
        let p = FilterPattern::new("").unwrap();
        assert!(p.is_match(""));
        assert!(p.is_match("anything"));
    }
}

//! Text matching shared by the Stump rules.
//!
//! - `FoldedText` - literal text compared case-insensitively
//! - `TextMatcher` - the `not:` / `regex:` / exact pattern matcher

use regex::{Regex, RegexBuilder};
use std::sync::Arc;

/// Prefix that inverts the rest of the pattern.
pub const NOT_PREFIX: &str = "not:";
/// Prefix that marks the rest of the pattern as a regular expression.
pub const REGEX_PREFIX: &str = "regex:";

/// Case-insensitive comparisons use this folding everywhere.
pub fn fold(text: &str) -> String {
    text.to_lowercase()
}

/// Literal text with its case-folded form computed once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoldedText {
    text: String,
    folded: String,
}

impl FoldedText {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let folded = fold(&text);
        Self { text, folded }
    }

    /// The text as written.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn eq_ignore_case(&self, candidate: &str) -> bool {
        fold(candidate) == self.folded
    }

    /// Substring test against a haystack that has already gone through [`fold`].
    pub fn is_in_folded(&self, folded_haystack: &str) -> bool {
        folded_haystack.contains(&self.folded)
    }
}

#[derive(Debug, Clone)]
enum TextMatchKind {
    Exact(FoldedText),
    Regex { regex: Arc<Regex>, wildcard: bool },
}

/// A regex counts as a wildcard when it accepts both the empty string and an
/// arbitrary non-empty one (`.*`, `x*`, `^`). `^$` is not a wildcard.
fn is_wildcard(regex: &Regex) -> bool {
    regex.is_match("") && regex.is_match("\u{0}")
}

/// Compiled text pattern.
///
/// Pattern syntax, checked in order:
/// 1. `not:` inverts the result of the remaining pattern (one level only)
/// 2. `regex:` case-insensitive regex that may match anywhere in the candidate
/// 3. anything else is a case-insensitive exact comparison
///
/// A missing or empty candidate equals only an empty exact pattern, and
/// matches a regex only when the regex is a wildcard.
#[derive(Debug, Clone)]
pub struct TextMatcher {
    pattern: String,
    inverted: bool,
    kind: TextMatchKind,
}

impl TextMatcher {
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        let (inverted, rest) = match pattern.strip_prefix(NOT_PREFIX) {
            Some(rest) => (true, rest),
            None => (false, pattern),
        };

        let kind = match rest.strip_prefix(REGEX_PREFIX) {
            Some(expr) => {
                let regex = RegexBuilder::new(expr).case_insensitive(true).build()?;
                TextMatchKind::Regex {
                    wildcard: is_wildcard(&regex),
                    regex: Arc::new(regex),
                }
            }
            None => TextMatchKind::Exact(FoldedText::new(rest)),
        };

        Ok(Self {
            pattern: pattern.to_string(),
            inverted,
            kind,
        })
    }

    /// The pattern as originally written.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn is_inverted(&self) -> bool {
        self.inverted
    }

    pub fn is_match(&self, candidate: Option<&str>) -> bool {
        let candidate = candidate.unwrap_or("");
        let matched = match &self.kind {
            TextMatchKind::Exact(text) => text.eq_ignore_case(candidate),
            TextMatchKind::Regex { wildcard, .. } if candidate.is_empty() => *wildcard,
            TextMatchKind::Regex { regex, .. } => regex.is_match(candidate),
        };
        matched != self.inverted
    }
}

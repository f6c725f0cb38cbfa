//! Body content rule: plain-text "must contain" assertions over the request
//! body.

use super::matcher::{fold, FoldedText};
use crate::http::StumpsHttpRequest;

/// Returns true when `bytes` look like text.
///
/// The body must be valid UTF-8 and contain no control characters other than
/// tab, line feed, carriage return and form feed. A NUL byte is the usual
/// tell for binary payloads and is rejected by the same check.
pub fn is_text(bytes: &[u8]) -> bool {
    match std::str::from_utf8(bytes) {
        Ok(text) => !text
            .chars()
            .any(|c| c.is_control() && !matches!(c, '\t' | '\n' | '\r' | '\u{000C}')),
        Err(_) => false,
    }
}

/// Matches when the body is text and contains every assertion
/// (case-insensitive).
#[derive(Debug, Clone, Default)]
pub struct BodyContentRule {
    assertions: Vec<FoldedText>,
}

impl BodyContentRule {
    pub fn new<I, S>(assertions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            assertions: assertions
                .into_iter()
                .map(|s| FoldedText::new(s.as_ref()))
                .collect(),
        }
    }

    pub fn assertions(&self) -> impl Iterator<Item = &str> {
        self.assertions.iter().map(FoldedText::as_str)
    }

    pub fn is_match(&self, request: &StumpsHttpRequest) -> bool {
        if request.body.is_empty() || !is_text(&request.body) {
            return false;
        }

        let body = fold(&String::from_utf8_lossy(&request.body));
        self.assertions
            .iter()
            .all(|assertion| assertion.is_in_folded(&body))
    }
}

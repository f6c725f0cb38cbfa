//! Header rule: a name pattern and a value pattern evaluated against the
//! same header.

use super::matcher::TextMatcher;
use super::rule::RuleError;
use crate::http::StumpsHttpRequest;

/// Matches when any single request header satisfies both patterns.
///
/// Each side has its own polarity, so `not:` on the name and a plain value
/// means "some header other than this one carries the value".
#[derive(Debug, Clone)]
pub struct HeaderRule {
    name: TextMatcher,
    value: TextMatcher,
}

impl HeaderRule {
    pub fn new(name_pattern: &str, value_pattern: &str) -> Result<Self, RuleError> {
        Ok(Self {
            name: TextMatcher::new(name_pattern)
                .map_err(|e| RuleError::InvalidPattern(name_pattern.to_string(), e))?,
            value: TextMatcher::new(value_pattern)
                .map_err(|e| RuleError::InvalidPattern(value_pattern.to_string(), e))?,
        })
    }

    pub fn name_pattern(&self) -> &str {
        self.name.pattern()
    }

    pub fn value_pattern(&self) -> &str {
        self.value.pattern()
    }

    pub fn is_match(&self, request: &StumpsHttpRequest) -> bool {
        request.headers.iter().any(|header| {
            self.name.is_match(Some(&header.name)) && self.value.is_match(Some(&header.value))
        })
    }
}

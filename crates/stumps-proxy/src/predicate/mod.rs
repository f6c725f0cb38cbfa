//! Rule engine deciding whether a Stump applies to a request.
//!
//! Two rule kinds exist: header rules (a name pattern and a value pattern
//! with independent `not:`/`regex:` prefixes) and body content rules
//! (case-insensitive substring assertions). A Stump matches when all of its
//! rules match.
//!
//! # Module Structure
//!
//! - `matcher` - `FoldedText` and the prefix-driven `TextMatcher`
//! - `header_rule` - Existential header matching
//! - `body_rule` - Body containment matching and the text heuristic
//! - `rule` - `StumpRule` dispatch and the serializable `RuleDefinition`

mod body_rule;
mod header_rule;
mod matcher;
mod rule;

pub use body_rule::{is_text, BodyContentRule};
pub use header_rule::HeaderRule;
pub use matcher::{fold, FoldedText, TextMatcher, NOT_PREFIX, REGEX_PREFIX};
pub use rule::{RuleDefinition, RuleError, StumpRule};

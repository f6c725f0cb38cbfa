//! Stump rule definitions and their compiled form.

use super::body_rule::BodyContentRule;
use super::header_rule::HeaderRule;
use crate::http::StumpsHttpRequest;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RuleError {
    #[error("Invalid pattern '{0}': {1}")]
    InvalidPattern(String, #[source] regex::Error),
}

/// Serializable rule definition, as stored in configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum RuleDefinition {
    /// `{ "type": "header", "name": "...", "value": "..." }`
    Header { name: String, value: String },
    /// `{ "type": "bodyContent", "text": ["...", "..."] }`
    #[serde(rename_all = "camelCase")]
    BodyContent {
        #[serde(default)]
        text: Vec<String>,
    },
}

/// Compiled rule evaluated against inbound requests.
#[derive(Debug, Clone)]
pub enum StumpRule {
    Header(HeaderRule),
    BodyContent(BodyContentRule),
}

impl StumpRule {
    pub fn compile(definition: &RuleDefinition) -> Result<Self, RuleError> {
        match definition {
            RuleDefinition::Header { name, value } => {
                Ok(StumpRule::Header(HeaderRule::new(name, value)?))
            }
            RuleDefinition::BodyContent { text } => {
                Ok(StumpRule::BodyContent(BodyContentRule::new(text)))
            }
        }
    }

    pub fn is_match(&self, request: &StumpsHttpRequest) -> bool {
        match self {
            StumpRule::Header(rule) => rule.is_match(request),
            StumpRule::BodyContent(rule) => rule.is_match(request),
        }
    }

    /// Convert back into the serializable definition.
    pub fn definition(&self) -> RuleDefinition {
        match self {
            StumpRule::Header(rule) => RuleDefinition::Header {
                name: rule.name_pattern().to_string(),
                value: rule.value_pattern().to_string(),
            },
            StumpRule::BodyContent(rule) => RuleDefinition::BodyContent {
                text: rule.assertions().map(str::to_string).collect(),
            },
        }
    }
}

impl From<HeaderRule> for StumpRule {
    fn from(rule: HeaderRule) -> Self {
        StumpRule::Header(rule)
    }
}

impl From<BodyContentRule> for StumpRule {
    fn from(rule: BodyContentRule) -> Self {
        StumpRule::BodyContent(rule)
    }
}

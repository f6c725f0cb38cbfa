//! Stump definition and errors.

use crate::http::StumpsHttpRequest;
use crate::predicate::{RuleDefinition, RuleError, StumpRule};
use crate::recording::RecordedResponse;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StumpError {
    #[error("Illegal argument: {0}")]
    IllegalArgument(String),
    #[error("A Stump with id '{0}' is already registered")]
    DuplicateId(String),
    #[error(transparent)]
    Rule(#[from] RuleError),
}

/// A rule set plus the canned response returned when it matches.
///
/// Rules and response are fixed at construction; matching never mutates
/// either.
#[derive(Debug, Clone)]
pub struct Stump {
    id: String,
    name: Option<String>,
    rules: Vec<StumpRule>,
    response: Arc<RecordedResponse>,
}

impl Stump {
    pub fn new(
        id: impl Into<String>,
        name: Option<String>,
        rules: Vec<StumpRule>,
        response: RecordedResponse,
    ) -> Result<Self, StumpError> {
        let id = id.into();
        if id.is_empty() {
            return Err(StumpError::IllegalArgument("stump id is empty".to_string()));
        }
        if !response.is_valid() {
            return Err(StumpError::IllegalArgument(format!(
                "stump '{}' has invalid response status {}",
                id,
                response.status_code()
            )));
        }

        Ok(Self {
            id,
            name,
            rules,
            response: Arc::new(response),
        })
    }

    /// Compile rule definitions and build the Stump.
    pub fn from_definitions(
        id: impl Into<String>,
        name: Option<String>,
        rules: &[RuleDefinition],
        response: RecordedResponse,
    ) -> Result<Self, StumpError> {
        let compiled = rules
            .iter()
            .map(StumpRule::compile)
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(id, name, compiled, response)
    }

    /// Fresh random identifier for Stumps created without one.
    pub fn generate_id() -> String {
        uuid::Uuid::new_v4().to_string()
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn rules(&self) -> &[StumpRule] {
        &self.rules
    }

    pub fn response(&self) -> &Arc<RecordedResponse> {
        &self.response
    }

    /// True when every rule matches. A Stump without rules never matches.
    pub fn is_match(&self, request: &StumpsHttpRequest) -> bool {
        !self.rules.is_empty() && self.rules.iter().all(|rule| rule.is_match(request))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predicate::{BodyContentRule, HeaderRule};
    use bytes::Bytes;

    fn ok_response() -> RecordedResponse {
        RecordedResponse::new(200, "OK", vec![], Bytes::from("ok"))
    }

    #[test]
    fn test_all_rules_must_match() {
        let stump = Stump::new(
            "s1",
            None,
            vec![
                HeaderRule::new("content-type", "application/json").unwrap().into(),
                BodyContentRule::new(["order"]).into(),
            ],
            ok_response(),
        )
        .unwrap();

        let json = StumpsHttpRequest::new("POST", "/")
            .with_header("Content-Type", "application/json");
        assert!(!stump.is_match(&json));
        assert!(stump.is_match(&json.clone().with_body("new order")));
    }

    #[test]
    fn test_empty_rule_set_never_matches() {
        let stump = Stump::new("s1", None, vec![], ok_response()).unwrap();
        assert!(!stump.is_match(&StumpsHttpRequest::default()));
    }

    #[test]
    fn test_invalid_response_is_illegal_argument() {
        let result = Stump::new(
            "s1",
            None,
            vec![],
            RecordedResponse::new(0, "", vec![], Bytes::new()),
        );
        assert!(matches!(result, Err(StumpError::IllegalArgument(_))));
    }

    #[test]
    fn test_empty_id_is_illegal_argument() {
        assert!(matches!(
            Stump::new("", None, vec![], ok_response()),
            Err(StumpError::IllegalArgument(_))
        ));
    }

    #[test]
    fn test_from_definitions_propagates_rule_errors() {
        let result = Stump::from_definitions(
            "s1",
            Some("broken".to_string()),
            &[RuleDefinition::Header {
                name: "regex:(".to_string(),
                value: String::new(),
            }],
            ok_response(),
        );
        assert!(matches!(result, Err(StumpError::Rule(_))));
    }

    #[test]
    fn test_generate_id_is_unique() {
        assert_ne!(Stump::generate_id(), Stump::generate_id());
    }
}

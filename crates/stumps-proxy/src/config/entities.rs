//! Persisted configuration entities.

use super::ConfigError;
use crate::environment::ProxyEnvironment;
use crate::predicate::RuleDefinition;
use crate::recording::RecordedResponse;
use crate::stump::{Stump, StumpError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DATA_COMPATIBILITY_VERSION: &str = "1.0";
pub const DEFAULT_WEB_API_PORT: u16 = 8888;

fn default_data_compatibility_version() -> String {
    DATA_COMPATIBILITY_VERSION.to_string()
}

fn default_storage_path() -> PathBuf {
    PathBuf::from("storage")
}

fn default_web_api_port() -> u16 {
    DEFAULT_WEB_API_PORT
}

fn default_external_host_name() -> String {
    "localhost".to_string()
}

/// Top-level configuration document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigurationEntity {
    #[serde(default = "default_data_compatibility_version")]
    pub data_compatibility_version: String,
    #[serde(default = "default_storage_path")]
    pub storage_path: PathBuf,
    /// Port reserved for the management API
    #[serde(default = "default_web_api_port")]
    pub web_api_port: u16,
    #[serde(default)]
    pub proxies: Vec<ProxyEntity>,
}

impl Default for ConfigurationEntity {
    fn default() -> Self {
        Self {
            data_compatibility_version: default_data_compatibility_version(),
            storage_path: default_storage_path(),
            web_api_port: default_web_api_port(),
            proxies: Vec::new(),
        }
    }
}

/// One proxy instance and the Stumps it serves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyEntity {
    #[serde(default)]
    pub proxy_id: String,
    #[serde(default = "default_external_host_name")]
    pub external_host_name: String,
    pub port: u16,
    /// Accepted for compatibility; the listener only speaks plain HTTP
    #[serde(default)]
    pub use_ssl: bool,
    #[serde(default)]
    pub auto_start: bool,
    #[serde(default)]
    pub record_traffic: bool,
    #[serde(default)]
    pub stumps: Vec<StumpEntity>,
}

impl ProxyEntity {
    pub fn new(external_host_name: impl Into<String>, port: u16) -> Self {
        Self {
            proxy_id: uuid::Uuid::new_v4().to_string(),
            external_host_name: external_host_name.into(),
            port,
            use_ssl: false,
            auto_start: true,
            record_traffic: false,
            stumps: Vec::new(),
        }
    }
}

/// A Stump as written to disk: rule definitions instead of compiled rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StumpEntity {
    #[serde(default)]
    pub stump_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stump_name: Option<String>,
    #[serde(default)]
    pub rules: Vec<RuleDefinition>,
    pub response: RecordedResponse,
}

impl StumpEntity {
    /// Compile into a live Stump. An empty id is replaced with a fresh one.
    pub fn to_stump(&self) -> Result<Stump, StumpError> {
        let id = if self.stump_id.is_empty() {
            Stump::generate_id()
        } else {
            self.stump_id.clone()
        };
        Stump::from_definitions(
            id,
            self.stump_name.clone(),
            &self.rules,
            self.response.clone(),
        )
    }
}

impl From<&Stump> for StumpEntity {
    fn from(stump: &Stump) -> Self {
        Self {
            stump_id: stump.id().to_string(),
            stump_name: stump.name().map(str::to_string),
            rules: stump.rules().iter().map(|rule| rule.definition()).collect(),
            response: stump.response().as_ref().clone(),
        }
    }
}

impl ProxyEnvironment {
    /// Build an environment and register every Stump the entity lists, in order.
    pub fn from_entity(entity: &ProxyEntity) -> Result<Self, ConfigError> {
        let environment = Self::new(entity.external_host_name.clone());
        environment.set_record_traffic(entity.record_traffic);
        for stump in &entity.stumps {
            environment.stumps().add(stump.to_stump()?)?;
        }
        Ok(environment)
    }

    /// Snapshot the live state on top of the persisted proxy settings.
    pub fn to_entity(&self, settings: &ProxyEntity) -> ProxyEntity {
        ProxyEntity {
            external_host_name: self.external_host_name().to_string(),
            record_traffic: self.record_traffic(),
            stumps: self
                .stumps()
                .list()
                .iter()
                .map(|stump| StumpEntity::from(stump.as_ref()))
                .collect(),
            ..settings.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{HttpHeader, StumpsHttpRequest};
    use bytes::Bytes;

    const PROXY_JSON: &str = r#"{
        "proxyId": "p1",
        "externalHostName": "api.example.com",
        "port": 9000,
        "autoStart": true,
        "stumps": [
            {
                "stumpId": "json",
                "stumpName": "JSON callers",
                "rules": [
                    { "type": "header", "name": "Content-Type", "value": "regex:json" }
                ],
                "response": {
                    "statusCode": 200,
                    "statusDescription": "OK",
                    "headers": [ { "name": "Content-Type", "value": "application/json" } ],
                    "body": "e30="
                }
            },
            {
                "rules": [ { "type": "bodyContent", "text": ["ping"] } ],
                "response": { "statusCode": 204, "statusDescription": "No Content" }
            }
        ]
    }"#;

    #[test]
    fn test_configuration_defaults() {
        let config: ConfigurationEntity = serde_json::from_str("{}").unwrap();
        assert_eq!(config, ConfigurationEntity::default());
        assert_eq!(config.web_api_port, DEFAULT_WEB_API_PORT);
        assert_eq!(config.data_compatibility_version, "1.0");
    }

    #[test]
    fn test_proxy_entity_parses() {
        let entity: ProxyEntity = serde_json::from_str(PROXY_JSON).unwrap();

        assert_eq!(entity.proxy_id, "p1");
        assert_eq!(entity.port, 9000);
        assert!(entity.auto_start);
        assert!(!entity.use_ssl);
        assert!(!entity.record_traffic);
        assert_eq!(entity.stumps.len(), 2);
        assert_eq!(&entity.stumps[0].response.body()[..], b"{}");
        assert!(entity.stumps[1].stump_id.is_empty());
    }

    #[test]
    fn test_environment_from_entity() {
        let entity: ProxyEntity = serde_json::from_str(PROXY_JSON).unwrap();
        let environment = ProxyEnvironment::from_entity(&entity).unwrap();

        assert_eq!(environment.external_host_name(), "api.example.com");
        assert_eq!(environment.stumps().len(), 2);

        let stumps = environment.stumps().list();
        assert_eq!(stumps[0].id(), "json");
        assert!(!stumps[1].id().is_empty());

        let request = StumpsHttpRequest::new("POST", "/")
            .with_header("Content-Type", "application/JSON; charset=utf-8");
        let found = environment.stumps().find_stump(&request).unwrap();
        assert_eq!(found.id(), "json");

        let ping = StumpsHttpRequest::new("POST", "/").with_body("PING?");
        assert_eq!(
            environment.stumps().find_stump(&ping).unwrap().response().status_code(),
            204
        );
    }

    #[test]
    fn test_invalid_rule_is_reported() {
        let mut entity: ProxyEntity = serde_json::from_str(PROXY_JSON).unwrap();
        entity.stumps[0].rules = vec![RuleDefinition::Header {
            name: "regex:(".to_string(),
            value: "x".to_string(),
        }];

        assert!(matches!(
            ProxyEnvironment::from_entity(&entity),
            Err(ConfigError::Stump(StumpError::Rule(_)))
        ));
    }

    #[test]
    fn test_duplicate_stump_ids_are_reported() {
        let mut entity: ProxyEntity = serde_json::from_str(PROXY_JSON).unwrap();
        entity.stumps[1].stump_id = "json".to_string();

        assert!(matches!(
            ProxyEnvironment::from_entity(&entity),
            Err(ConfigError::Stump(StumpError::DuplicateId(_)))
        ));
    }

    #[test]
    fn test_to_entity_captures_live_state() {
        let settings = ProxyEntity::new("old.example.com", 8081);
        let environment = ProxyEnvironment::new("new.example.com");
        environment.set_record_traffic(true);
        environment
            .stumps()
            .add(
                StumpEntity {
                    stump_id: "s".to_string(),
                    stump_name: None,
                    rules: vec![RuleDefinition::Header {
                        name: "not:x-skip".to_string(),
                        value: "regex:.*".to_string(),
                    }],
                    response: RecordedResponse::new(
                        200,
                        "OK",
                        vec![HttpHeader::new("X-A", "1")],
                        Bytes::from_static(b"body"),
                    ),
                }
                .to_stump()
                .unwrap(),
            )
            .unwrap();

        let entity = environment.to_entity(&settings);

        assert_eq!(entity.proxy_id, settings.proxy_id);
        assert_eq!(entity.port, 8081);
        assert_eq!(entity.external_host_name, "new.example.com");
        assert!(entity.record_traffic);
        assert_eq!(entity.stumps.len(), 1);
        assert_eq!(entity.stumps[0].stump_id, "s");
        assert_eq!(
            entity.stumps[0].rules,
            vec![RuleDefinition::Header {
                name: "not:x-skip".to_string(),
                value: "regex:.*".to_string(),
            }]
        );
    }
}

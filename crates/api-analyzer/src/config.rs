//! Analyzer configuration
//!
//! Carries the identity strings stamped onto the report plus the free-form
//! nested parameter mapping used to resolve `${...}` placeholders found in
//! client annotations.

use serde::Deserialize;
use serde_yaml::Value;
use std::path::Path;
use tracing::{debug, warn};

use crate::error::AnalyzeResult;

/// Configuration for one analysis run
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalyzerConfig {
    /// Deployment environment the report describes (free-form)
    pub environment: String,
    /// Organization owning the analyzed service
    pub organization_name: String,
    /// Product the analyzed service belongs to
    pub product_name: String,
    /// Name of the analyzed service
    pub application_name: String,
    /// Nested key-value configuration for parametric placeholder resolution
    pub parameters: Value,
}

impl AnalyzerConfig {
    /// Parse a configuration from a YAML document
    pub fn from_yaml_str(contents: &str) -> AnalyzeResult<Self> {
        let config = serde_yaml::from_str(contents)?;
        Ok(config)
    }

    /// Load a configuration from a YAML file
    pub fn from_file(path: &Path) -> AnalyzeResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        debug!("Loaded analyzer config from {:?}", path);
        Self::from_yaml_str(&contents)
    }
}

/// Resolves `${...}` placeholder tokens against the nested parameter mapping
#[derive(Debug, Clone, Default)]
pub struct ParamResolver {
    parameters: Value,
}

impl ParamResolver {
    pub fn new(parameters: Value) -> Self {
        Self { parameters }
    }

    /// Whether a token is a parametric placeholder
    pub fn is_parametric(token: &str) -> bool {
        token.starts_with("${") && token.ends_with('}')
    }

    /// Resolve a parametric token to its configured value.
    ///
    /// Returns `None` for non-parametric tokens, for any missing or
    /// non-mapping intermediate segment, and for non-scalar terminal values.
    /// Segment lookup is case-insensitive at every nesting level.
    pub fn resolve(&self, token: &str) -> Option<String> {
        if !Self::is_parametric(token) {
            return None;
        }

        let path = &token[2..token.len() - 1];
        let mut current = &self.parameters;

        let segments: Vec<&str> = path.split('.').collect();
        let (last, intermediate) = segments.split_last()?;

        for segment in intermediate {
            let Some(next) = lookup_ignore_case(current, segment) else {
                warn!("No configuration entry for path segment: {}", segment);
                return None;
            };
            if !next.is_mapping() {
                warn!("Configuration path segment is not a mapping: {}", segment);
                return None;
            }
            current = next;
        }

        let value = lookup_ignore_case(current, last)?;
        stringify_scalar(value)
    }
}

fn lookup_ignore_case<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    let mapping = value.as_mapping()?;
    mapping
        .iter()
        .find(|(k, _)| k.as_str().is_some_and(|k| k.eq_ignore_ascii_case(key)))
        .map(|(_, v)| v)
}

fn stringify_scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver(yaml: &str) -> ParamResolver {
        ParamResolver::new(serde_yaml::from_str(yaml).unwrap())
    }

    #[test]
    fn test_resolve_case_insensitive_nested_path() {
        let resolver = resolver("Endpoint:\n  postOffice: po-app\n");
        assert_eq!(
            resolver.resolve("${endpoint.postoffice}"),
            Some("po-app".to_string())
        );
    }

    #[test]
    fn test_plain_value_is_not_parametric() {
        let resolver = resolver("Endpoint:\n  postOffice: po-app\n");
        assert_eq!(resolver.resolve("plain-value"), None);
    }

    #[test]
    fn test_missing_segment_fails() {
        let resolver = resolver("endpoint:\n  a: x\n");
        assert_eq!(resolver.resolve("${endpoint.missing}"), None);
        assert_eq!(resolver.resolve("${other.a}"), None);
    }

    #[test]
    fn test_non_mapping_intermediate_fails() {
        let resolver = resolver("endpoint: scalar\n");
        assert_eq!(resolver.resolve("${endpoint.a}"), None);
    }

    #[test]
    fn test_scalar_values_are_stringified() {
        let resolver = resolver("limits:\n  retries: 3\n  enabled: true\n");
        assert_eq!(resolver.resolve("${limits.retries}"), Some("3".to_string()));
        assert_eq!(
            resolver.resolve("${limits.enabled}"),
            Some("true".to_string())
        );
    }

    #[test]
    fn test_mapping_terminal_fails() {
        let resolver = resolver("endpoint:\n  nested:\n    a: x\n");
        assert_eq!(resolver.resolve("${endpoint.nested}"), None);
    }

    #[test]
    fn test_config_from_yaml() {
        let config = AnalyzerConfig::from_yaml_str(
            "environment: prod\napplicationName: orders\nparameters:\n  endpoint:\n    billing: org.billing.core\n",
        )
        .unwrap();
        assert_eq!(config.environment, "prod");
        assert_eq!(config.application_name, "orders");

        let resolver = ParamResolver::new(config.parameters);
        assert_eq!(
            resolver.resolve("${endpoint.billing}"),
            Some("org.billing.core".to_string())
        );
    }
}

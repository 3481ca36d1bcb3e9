//! Config parsing
//!
//! TOML is the primary format, JSON is accepted as well.

use contracts::{ContractError, RelayBlueprint};

/// Config file format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// TOML (preferred)
    Toml,
    Json,
}

impl ConfigFormat {
    /// Infer format from a file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

pub fn parse_toml(content: &str) -> Result<RelayBlueprint, ContractError> {
    toml::from_str(content).map_err(|e| ContractError::ConfigParse {
        message: format!("TOML parse error: {e}"),
        source: Some(Box::new(e)),
    })
}

pub fn parse_json(content: &str) -> Result<RelayBlueprint, ContractError> {
    serde_json::from_str(content).map_err(|e| ContractError::ConfigParse {
        message: format!("JSON parse error: {e}"),
        source: Some(Box::new(e)),
    })
}

pub fn parse(content: &str, format: ConfigFormat) -> Result<RelayBlueprint, ContractError> {
    match format {
        ConfigFormat::Toml => parse_toml(content),
        ConfigFormat::Json => parse_json(content),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{ProviderKind, SinkType};

    #[test]
    fn test_parse_toml_full() {
        let content = r#"
version = "V1"

[dispatch]
max_retries = 3

[rate_limit]
limit = 5
window_secs = 30

[[providers]]
name = "primary"
success_rate = 0.9

[[providers]]
name = "backup"
kind = "always_ok"

[[sinks]]
name = "audit"
sink_type = "file"
queue_capacity = 50
params = { path = "./events.jsonl" }
"#;
        let bp = parse_toml(content).unwrap();
        assert_eq!(bp.dispatch.max_retries, 3);
        assert_eq!(bp.rate_limit.limit, 5);
        assert_eq!(bp.rate_limit.window_secs, 30);
        assert_eq!(bp.providers.len(), 2);
        assert_eq!(bp.providers[0].kind, ProviderKind::Simulated);
        assert_eq!(bp.providers[1].kind, ProviderKind::AlwaysOk);
        assert_eq!(bp.sinks[0].sink_type, SinkType::File);
        assert_eq!(bp.sinks[0].params["path"], "./events.jsonl");
    }

    #[test]
    fn test_parse_toml_defaults() {
        let content = r#"
[[providers]]
name = "only"
"#;
        let bp = parse_toml(content).unwrap();
        assert_eq!(bp.dispatch.max_retries, 2);
        assert_eq!(bp.rate_limit.limit, 10);
        assert_eq!(bp.rate_limit.window_secs, 60);
        assert!(bp.sinks.is_empty());
    }

    #[test]
    fn test_parse_json_minimal() {
        let content = r#"{
            "providers": [{ "name": "Provider1" }, { "name": "Provider2", "success_rate": 0.5 }],
            "sinks": [{ "name": "log", "sink_type": "log" }]
        }"#;
        let bp = parse_json(content).unwrap();
        assert_eq!(bp.providers.len(), 2);
        assert_eq!(bp.sinks[0].queue_capacity, 100);
    }

    #[test]
    fn test_parse_toml_syntax_error() {
        let result = parse_toml("invalid toml [[[");
        assert!(matches!(result, Err(ContractError::ConfigParse { .. })));
    }

    #[test]
    fn test_parse_unknown_provider_kind() {
        let content = r#"
[[providers]]
name = "x"
kind = "carrier_pigeon"
"#;
        assert!(parse_toml(content).is_err());
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(
            ConfigFormat::from_extension("toml"),
            Some(ConfigFormat::Toml)
        );
        assert_eq!(
            ConfigFormat::from_extension("TOML"),
            Some(ConfigFormat::Toml)
        );
        assert_eq!(
            ConfigFormat::from_extension("json"),
            Some(ConfigFormat::Json)
        );
        assert_eq!(ConfigFormat::from_extension("yaml"), None);
    }
}

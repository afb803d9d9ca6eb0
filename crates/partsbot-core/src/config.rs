use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{PartsbotError, Result};

/// Top-level partsbot configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub dialogue: DialogueConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub assistant: AssistantConfig,
}

/// Connection to the external dialogue backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DialogueConfig {
    #[serde(default = "default_dialogue_url")]
    pub url: String,
    #[serde(default)]
    pub api_key: Option<String>,
    /// Timeout for non-streaming calls (chat, health). Streams are not capped.
    #[serde(default = "default_dialogue_timeout")]
    pub timeout_secs: u64,
    /// Extra `config` object forwarded with every chat request.
    #[serde(default = "default_request_config")]
    pub request_config: serde_json::Map<String, serde_json::Value>,
}

impl Default for DialogueConfig {
    fn default() -> Self {
        Self {
            url: default_dialogue_url(),
            api_key: None,
            timeout_secs: default_dialogue_timeout(),
            request_config: default_request_config(),
        }
    }
}

impl DialogueConfig {
    pub fn has_api_key(&self) -> bool {
        usable_key(self.api_key.as_deref()).is_some()
    }
}

fn default_dialogue_url() -> String { "http://localhost:8000".to_string() }
fn default_dialogue_timeout() -> u64 { 60 }

fn default_request_config() -> serde_json::Map<String, serde_json::Value> {
    let mut map = serde_json::Map::new();
    map.insert("truck_parts_mode".into(), serde_json::Value::Bool(true));
    map.insert("intella_parts_integration".into(), serde_json::Value::Bool(true));
    map
}

/// How the catalog API expects credentials.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum AuthMethod {
    #[default]
    Bearer,
    ApiKey,
    Basic,
    None,
}

/// Known catalog URL layouts.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EndpointPreset {
    #[default]
    Legacy,
    V1,
    Restful,
}

/// Endpoint table selection. Explicit paths override the preset's.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EndpointsConfig {
    #[serde(default)]
    pub preset: EndpointPreset,
    #[serde(default)]
    pub search: Option<String>,
    /// Path template; `{partNumber}` is replaced by the encoded part number.
    #[serde(default)]
    pub part_details: Option<String>,
}

/// Third-party parts catalog API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    #[serde(default = "default_catalog_url")]
    pub base_url: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub auth_method: AuthMethod,
    #[serde(default)]
    pub endpoints: EndpointsConfig,
    #[serde(default = "default_catalog_timeout")]
    pub timeout_secs: u64,
    /// Public storefront used to build product links.
    #[serde(default = "default_storefront_url")]
    pub storefront_url: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: default_catalog_url(),
            api_key: None,
            auth_method: AuthMethod::default(),
            endpoints: EndpointsConfig::default(),
            timeout_secs: default_catalog_timeout(),
            storefront_url: default_storefront_url(),
        }
    }
}

impl CatalogConfig {
    pub fn has_api_key(&self) -> bool {
        usable_key(self.api_key.as_deref()).is_some()
    }
}

/// A key that is set, non-empty and not an unexpanded `${VAR}` reference.
pub fn usable_key(key: Option<&str>) -> Option<&str> {
    key.filter(|k| !k.is_empty() && !k.starts_with("${"))
}

fn default_catalog_url() -> String { "https://api.intellaparts.com".to_string() }
fn default_catalog_timeout() -> u64 { 30 }
fn default_storefront_url() -> String { "https://www.intellaparts.com".to_string() }

/// HTTP gateway settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Origins allowed to embed the widget. Empty = any origin.
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            allowed_origins: Vec::new(),
        }
    }
}

fn default_bind() -> String { "127.0.0.1:3000".to_string() }

/// Which search stage the local conversation graph uses.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FinderKind {
    #[default]
    Mock,
    Catalog,
}

/// Local conversation graph settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantConfig {
    #[serde(default)]
    pub finder: FinderKind,
    #[serde(default = "default_result_limit")]
    pub result_limit: u32,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            finder: FinderKind::default(),
            result_limit: default_result_limit(),
        }
    }
}

fn default_result_limit() -> u32 { 5 }

/// Environment variables that override file values.
pub const ENV_DIALOGUE_URL: &str = "DIALOGUE_BACKEND_URL";
pub const ENV_DIALOGUE_API_KEY: &str = "DIALOGUE_BACKEND_API_KEY";
pub const ENV_CATALOG_URL: &str = "CATALOG_API_URL";
pub const ENV_CATALOG_API_KEY: &str = "CATALOG_API_KEY";

impl AppConfig {
    /// Load config from a TOML file, with env var expansion.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|_| PartsbotError::ConfigNotFound(path.display().to_string()))?;

        Self::from_toml(&content)
    }

    /// Parse TOML text, expanding `${ENV_VAR}` references first.
    pub fn from_toml(content: &str) -> Result<Self> {
        let expanded = expand_env_vars(content);
        toml::from_str(&expanded).map_err(|e| PartsbotError::Config(e.to_string()))
    }

    /// Load the file if it exists, otherwise start from defaults; then apply
    /// environment overrides.
    pub fn resolve(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            Self::load(path)?
        } else {
            debug!(path = %path.display(), "Config file absent, using defaults");
            Self::default()
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Apply overrides from a key lookup (normally the process environment).
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|v| !v.is_empty());
        if let Some(url) = lookup(ENV_DIALOGUE_URL) {
            self.dialogue.url = url;
        }
        if let Some(key) = lookup(ENV_DIALOGUE_API_KEY) {
            self.dialogue.api_key = Some(key);
        }
        if let Some(url) = lookup(ENV_CATALOG_URL) {
            self.catalog.base_url = url;
        }
        if let Some(key) = lookup(ENV_CATALOG_API_KEY) {
            self.catalog.api_key = Some(key);
        }
    }
}

/// Expand `${ENV_VAR}` patterns in a string.
fn expand_env_vars(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '$' && chars.peek() == Some(&'{') {
            chars.next(); // consume '{'
            let mut var_name = String::new();
            for c in chars.by_ref() {
                if c == '}' {
                    break;
                }
                var_name.push(c);
            }
            match std::env::var(&var_name) {
                Ok(val) => result.push_str(&val),
                // Keep original if env var not set
                Err(_) => result.push_str(&format!("${{{}}}", var_name)),
            }
        } else {
            result.push(c);
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_expand_env_vars() {
        std::env::set_var("TEST_PARTSBOT_VAR", "hello");
        let result = expand_env_vars("key = \"${TEST_PARTSBOT_VAR}\"");
        assert_eq!(result, "key = \"hello\"");
        std::env::remove_var("TEST_PARTSBOT_VAR");
    }

    #[test]
    fn test_expand_env_vars_missing() {
        let result = expand_env_vars("key = \"${NONEXISTENT_PARTSBOT_VAR}\"");
        assert_eq!(result, "key = \"${NONEXISTENT_PARTSBOT_VAR}\"");
    }

    #[test]
    fn test_defaults_from_empty_toml() {
        let config = AppConfig::from_toml("").unwrap();
        assert_eq!(config.dialogue.url, "http://localhost:8000");
        assert_eq!(config.dialogue.timeout_secs, 60);
        assert_eq!(
            config.dialogue.request_config.get("truck_parts_mode"),
            Some(&serde_json::Value::Bool(true))
        );
        assert_eq!(
            config.dialogue.request_config.get("intella_parts_integration"),
            Some(&serde_json::Value::Bool(true))
        );
        assert_eq!(config.catalog.base_url, "https://api.intellaparts.com");
        assert_eq!(config.catalog.auth_method, AuthMethod::Bearer);
        assert_eq!(config.catalog.endpoints.preset, EndpointPreset::Legacy);
        assert_eq!(config.gateway.bind, "127.0.0.1:3000");
        assert!(config.gateway.allowed_origins.is_empty());
        assert_eq!(config.assistant.finder, FinderKind::Mock);
        assert_eq!(config.assistant.result_limit, 5);
    }

    #[test]
    fn test_kebab_case_auth_method() {
        let config = AppConfig::from_toml(
            r#"
[catalog]
auth_method = "api-key"

[catalog.endpoints]
preset = "v1"
part_details = "/v2/items/{partNumber}"
"#,
        )
        .unwrap();
        assert_eq!(config.catalog.auth_method, AuthMethod::ApiKey);
        assert_eq!(config.catalog.endpoints.preset, EndpointPreset::V1);
        assert_eq!(
            config.catalog.endpoints.part_details.as_deref(),
            Some("/v2/items/{partNumber}")
        );
    }

    #[test]
    fn test_overrides_replace_file_values() {
        let mut config = AppConfig::from_toml(
            r#"
[dialogue]
url = "http://file:8000"

[catalog]
api_key = "file-key"
"#,
        )
        .unwrap();

        let env: HashMap<&str, &str> = [
            (ENV_DIALOGUE_URL, "http://env:9000"),
            (ENV_CATALOG_API_KEY, ""),
            (ENV_DIALOGUE_API_KEY, "dlg-secret"),
        ]
        .into_iter()
        .collect();
        config.apply_overrides(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(config.dialogue.url, "http://env:9000");
        assert_eq!(config.dialogue.api_key.as_deref(), Some("dlg-secret"));
        // Empty values do not clobber the file
        assert_eq!(config.catalog.api_key.as_deref(), Some("file-key"));
    }

    #[test]
    fn test_has_api_key_ignores_unexpanded_placeholder() {
        let mut catalog = CatalogConfig::default();
        assert!(!catalog.has_api_key());
        catalog.api_key = Some("${CATALOG_SECRET}".into());
        assert!(!catalog.has_api_key());
        catalog.api_key = Some("abc".into());
        assert!(catalog.has_api_key());

        let mut dialogue = DialogueConfig::default();
        dialogue.api_key = Some("${DIALOGUE_SECRET}".into());
        assert!(!dialogue.has_api_key());
        dialogue.api_key = Some(String::new());
        assert!(!dialogue.has_api_key());
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = AppConfig::from_toml("[gateway\nbind = 1").unwrap_err();
        assert!(matches!(err, PartsbotError::Config(_)));
    }
}

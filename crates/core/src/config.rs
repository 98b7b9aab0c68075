use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

use crate::error::Result;
use crate::paths::Paths;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProviderConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub api_base: Option<String>,
}

/// Market-data REST provider (stock.indianapi.in).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketConfig {
    #[serde(default = "default_market_api_base")]
    pub api_base: String,
    #[serde(default)]
    pub api_key: String,
}

fn default_market_api_base() -> String {
    "https://stock.indianapi.in".to_string()
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            api_base: default_market_api_base(),
            api_key: String::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentDefaults {
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tool_iterations")]
    pub max_tool_iterations: u32,
    /// Extra attempts after a failed LLM call. Zero means a failure ends the stage.
    #[serde(default)]
    pub llm_max_retries: u32,
    #[serde(default = "default_llm_retry_delay_ms")]
    pub llm_retry_delay_ms: u64,
}

fn default_model() -> String {
    "gemini/gemini-2.0-flash".to_string()
}

fn default_max_tokens() -> u32 {
    8192
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tool_iterations() -> u32 {
    10
}

fn default_llm_retry_delay_ms() -> u64 {
    2000
}

impl Default for AgentDefaults {
    fn default() -> Self {
        Self {
            model: default_model(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            max_tool_iterations: default_max_tool_iterations(),
            llm_max_retries: 0,
            llm_retry_delay_ms: default_llm_retry_delay_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AgentsConfig {
    #[serde(default)]
    pub defaults: AgentDefaults,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayConfig {
    #[serde(default = "default_gateway_host")]
    pub host: String,
    #[serde(default = "default_gateway_port")]
    pub port: u16,
    /// Empty means any origin is allowed.
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

fn default_gateway_host() -> String {
    "0.0.0.0".to_string()
}

fn default_gateway_port() -> u16 {
    8000
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_gateway_host(),
            port: default_gateway_port(),
            allowed_origins: vec![],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebSearchConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_search_api_base")]
    pub api_base: String,
    #[serde(default = "default_max_results")]
    pub max_results: u32,
}

fn default_search_api_base() -> String {
    "https://google.serper.dev".to_string()
}

fn default_max_results() -> u32 {
    5
}

impl Default for WebSearchConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_base: default_search_api_base(),
            max_results: default_max_results(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct WebToolsConfig {
    #[serde(default)]
    pub search: WebSearchConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ToolsConfig {
    #[serde(default)]
    pub web: WebToolsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
    #[serde(default)]
    pub market: MarketConfig,
    #[serde(default)]
    pub agents: AgentsConfig,
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub tools: ToolsConfig,
}

impl Default for Config {
    fn default() -> Self {
        let mut providers = HashMap::new();
        providers.insert("gemini".to_string(), ProviderConfig::default());

        Self {
            providers,
            market: MarketConfig::default(),
            agents: AgentsConfig::default(),
            gateway: GatewayConfig::default(),
            tools: ToolsConfig::default(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    pub fn load_or_default(paths: &Paths) -> Result<Self> {
        let config_path = paths.config_file();
        if config_path.exists() {
            Self::load(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Overlay keys from the process environment on top of the file values.
    pub fn apply_env(&mut self) {
        self.apply_env_with(|key| std::env::var(key).ok());
    }

    pub fn apply_env_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(key) = get("GEMINI_API_KEY") {
            debug!("GEMINI_API_KEY taken from environment");
            self.providers.entry("gemini".to_string()).or_default().api_key = key;
        }
        if let Some(key) = get("SERPER_API_KEY") {
            debug!("SERPER_API_KEY taken from environment");
            self.tools.web.search.api_key = key;
        }
        if let Some(key) = get("INDIAN_API_KEY") {
            debug!("INDIAN_API_KEY taken from environment");
            self.market.api_key = key;
        }
        if let Some(base) = get("INDIAN_API_BASE") {
            self.market.api_base = base;
        }
    }

    pub fn get_provider(&self, name: &str) -> Option<&ProviderConfig> {
        self.providers.get(name)
    }

    /// Provider prefix of the configured model, e.g. `gemini` for `gemini/gemini-2.0-flash`.
    pub fn model_provider(&self) -> &str {
        let model = &self.agents.defaults.model;
        model.split_once('/').map(|(p, _)| p).unwrap_or("gemini")
    }

    pub fn llm_key_configured(&self) -> bool {
        self.get_provider(self.model_provider())
            .map(|p| !p.api_key.is_empty())
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_object() {
        let cfg: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg.market.api_base, "https://stock.indianapi.in");
        assert_eq!(cfg.agents.defaults.model, "gemini/gemini-2.0-flash");
        assert_eq!(cfg.agents.defaults.llm_max_retries, 0);
        assert_eq!(cfg.tools.web.search.max_results, 5);
        assert!(cfg.gateway.allowed_origins.is_empty());
    }

    #[test]
    fn test_camel_case_fields() {
        let raw = r#"{
  "market": { "apiBase": "http://localhost:9000", "apiKey": "m" },
  "tools": { "web": { "search": { "apiKey": "s", "maxResults": 3 } } },
  "gateway": { "port": 9001, "allowedOrigins": ["http://localhost:8501"] }
}"#;
        let cfg: Config = serde_json::from_str(raw).unwrap();
        assert_eq!(cfg.market.api_base, "http://localhost:9000");
        assert_eq!(cfg.market.api_key, "m");
        assert_eq!(cfg.tools.web.search.api_key, "s");
        assert_eq!(cfg.tools.web.search.max_results, 3);
        assert_eq!(cfg.gateway.port, 9001);
        assert_eq!(cfg.gateway.allowed_origins.len(), 1);
    }

    #[test]
    fn test_env_overrides_file_values() {
        let mut cfg = Config::default();
        cfg.market.api_key = "from-file".to_string();
        cfg.apply_env_with(|key| match key {
            "GEMINI_API_KEY" => Some("g".to_string()),
            "INDIAN_API_KEY" => Some("i".to_string()),
            "SERPER_API_KEY" => Some("   ".to_string()),
            _ => None,
        });
        assert_eq!(cfg.get_provider("gemini").unwrap().api_key, "g");
        assert_eq!(cfg.market.api_key, "i");
        assert!(cfg.tools.web.search.api_key.is_empty());
        assert!(cfg.llm_key_configured());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let paths = Paths::with_base(dir.path().to_path_buf());
        let mut cfg = Config::default();
        cfg.gateway.port = 8123;
        cfg.save(&paths.config_file()).unwrap();
        let loaded = Config::load_or_default(&paths).unwrap();
        assert_eq!(loaded.gateway.port, 8123);
    }

    #[test]
    fn test_model_provider_prefix() {
        let mut cfg = Config::default();
        assert_eq!(cfg.model_provider(), "gemini");
        cfg.agents.defaults.model = "openai/gpt-4o".to_string();
        assert_eq!(cfg.model_provider(), "openai");
    }
}

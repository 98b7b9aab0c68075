pub mod market;
pub mod registry;
pub mod web;

use async_trait::async_trait;
use dalal_core::{Config, Result};
use serde_json::Value;
use std::sync::Arc;

pub use market::dispatcher::{FetchError, MarketClient, MarketData};
pub use registry::ToolRegistry;

/// Truncate a string to at most `max_chars` characters, respecting UTF-8 char boundaries.
pub fn safe_truncate(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Everything a tool may need while executing. Cheap to clone.
#[derive(Clone)]
pub struct ToolContext {
    pub config: Config,
    pub market: Arc<dyn MarketData>,
}

impl ToolContext {
    pub fn new(config: Config, market: Arc<dyn MarketData>) -> Self {
        Self { config, market }
    }

    /// Context backed by the real market-data client built from `config.market`.
    pub fn from_config(config: Config) -> Self {
        let market: Arc<dyn MarketData> = Arc::new(MarketClient::from_config(&config.market));
        Self { config, market }
    }
}

pub struct ToolSchema {
    pub name: &'static str,
    pub description: &'static str,
    pub parameters: Value,
}

#[async_trait]
pub trait Tool: Send + Sync {
    fn schema(&self) -> ToolSchema;
    fn validate(&self, params: &Value) -> Result<()>;
    async fn execute(&self, ctx: ToolContext, params: Value) -> Result<Value>;
}

/// Flatten a tool result into the text handed back to the model.
pub fn result_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

use dalal_core::{Error, Result};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::market::MarketTool;
use crate::web::WebSearchTool;
use crate::{Tool, ToolContext};

#[derive(Clone)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

fn function_schema(tool: &Arc<dyn Tool>) -> Value {
    let schema = tool.schema();
    json!({
        "type": "function",
        "function": {
            "name": schema.name,
            "description": schema.description,
            "parameters": schema.parameters
        }
    })
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    pub fn with_defaults() -> Self {
        let mut registry = Self::new();

        // Web research
        registry.register(Arc::new(WebSearchTool));

        // Market data, one tool per endpoint
        for tool in MarketTool::all() {
            registry.register(tool);
        }

        registry
    }

    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        let schema = tool.schema();
        debug!(name = schema.name, "Registering tool");
        self.tools.insert(schema.name.to_string(), tool);
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Get tool schemas filtered by a list of tool names.
    /// Only returns schemas for tools whose names are in the provided list.
    pub fn get_filtered_schemas(&self, names: &[&str]) -> Vec<Value> {
        names
            .iter()
            .filter_map(|name| self.tools.get(*name))
            .map(function_schema)
            .collect()
    }

    /// All registered tool names, sorted.
    pub fn tool_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tools.keys().cloned().collect();
        names.sort();
        names
    }

    pub async fn execute(&self, name: &str, ctx: ToolContext, params: Value) -> Result<Value> {
        let tool = self
            .get(name)
            .ok_or_else(|| Error::Tool(format!("Unknown tool: {}", name)))?;

        if let Err(e) = tool.validate(&params) {
            warn!(tool = name, error = %e, "Tool validation failed");
            return Err(e);
        }

        debug!(tool = name, "Executing tool");
        tool.execute(ctx, params).await
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MarketClient;
    use dalal_core::Config;

    fn ctx() -> ToolContext {
        ToolContext::new(Config::default(), Arc::new(MarketClient::new("http://127.0.0.1:1", "")))
    }

    #[test]
    fn test_registry_new_empty() {
        let reg = ToolRegistry::new();
        assert!(reg.tool_names().is_empty());
        assert!(reg.get("web_search").is_none());
    }

    #[test]
    fn test_registry_with_defaults() {
        let reg = ToolRegistry::with_defaults();
        let names = reg.tool_names();
        assert_eq!(names.len(), 8);
        assert!(names.contains(&"web_search".to_string()));
        assert!(names.contains(&"get_trending_stocks".to_string()));
        assert!(names.contains(&"get_mutual_fund_search".to_string()));
    }

    #[test]
    fn test_filtered_schemas() {
        let reg = ToolRegistry::with_defaults();
        let schemas = reg.get_filtered_schemas(&["web_search", "nope"]);
        assert_eq!(schemas.len(), 1);
        assert_eq!(schemas[0]["type"], "function");
        assert_eq!(schemas[0]["function"]["name"], "web_search");
        assert_eq!(reg.get_filtered_schemas(&["get_trending_stocks", "web_search"])[1]["function"]["name"], "web_search");
    }

    #[tokio::test]
    async fn test_execute_unknown_tool() {
        let reg = ToolRegistry::with_defaults();
        let err = reg.execute("exec", ctx(), json!({})).await.unwrap_err();
        assert!(err.to_string().contains("Unknown tool"));
    }

    #[tokio::test]
    async fn test_execute_validates_first() {
        let reg = ToolRegistry::with_defaults();
        let err = reg
            .execute("get_stock_details", ctx(), json!({"name": "TCS"}))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }
}

use async_trait::async_trait;
use dalal_core::{Error, Result};
use reqwest::Client;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::{Tool, ToolContext, ToolSchema};

// ============ web_search ============

/// Google results through the Serper API.
pub struct WebSearchTool;

#[async_trait]
impl Tool for WebSearchTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "web_search",
            description: "Search the web for recent news and commentary, e.g. IPO updates, results announcements, market movers or analyst views on Indian companies.",
            parameters: json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "Search query"
                    },
                    "count": {
                        "type": "integer",
                        "description": "Number of results (1-10, default from config)"
                    }
                },
                "required": ["query"]
            }),
        }
    }

    fn validate(&self, params: &Value) -> Result<()> {
        match params.get("query").and_then(|v| v.as_str()) {
            Some(q) if !q.trim().is_empty() => Ok(()),
            _ => Err(Error::Validation("Missing required parameter: query".to_string())),
        }
    }

    async fn execute(&self, ctx: ToolContext, params: Value) -> Result<Value> {
        let query = params
            .get("query")
            .and_then(|v| v.as_str())
            .ok_or_else(|| Error::Validation("Missing required parameter: query".to_string()))?;
        let search = &ctx.config.tools.web.search;
        let count = params
            .get("count")
            .and_then(|v| v.as_u64())
            .unwrap_or(search.max_results as u64)
            .clamp(1, 10) as usize;

        if search.api_key.is_empty() {
            return Err(Error::Tool(
                "web_search is not configured: set SERPER_API_KEY or tools.web.search.apiKey".to_string(),
            ));
        }

        let data = serper_search(&search.api_base, &search.api_key, query, count).await?;
        Ok(parse_serper(query, &data, count))
    }
}

async fn serper_search(api_base: &str, api_key: &str, query: &str, count: usize) -> Result<Value> {
    let url = format!("{}/search", api_base.trim_end_matches('/'));
    debug!(url = %url, query, "Serper search");

    let response = Client::new()
        .post(&url)
        .header("X-API-KEY", api_key)
        .json(&json!({ "q": query, "num": count }))
        .send()
        .await
        .map_err(|e| Error::Tool(format!("Search request failed: {}", e)))?;

    if !response.status().is_success() {
        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        warn!(status = %status, "Serper search failed");
        return Err(Error::Tool(format!(
            "Search API error {}: {}",
            status,
            crate::safe_truncate(&text, 200)
        )));
    }

    response
        .json()
        .await
        .map_err(|e| Error::Tool(format!("Failed to parse search response: {}", e)))
}

fn parse_serper(query: &str, data: &Value, count: usize) -> Value {
    let results: Vec<Value> = data
        .get("organic")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .take(count)
        .map(|r| {
            json!({
                "title": r.get("title").cloned().unwrap_or(Value::Null),
                "url": r.get("link").cloned().unwrap_or(Value::Null),
                "snippet": r.get("snippet").cloned().unwrap_or(Value::Null)
            })
        })
        .collect();

    let mut out = json!({ "query": query, "results": results, "source": "serper" });
    let answer = data
        .get("answerBox")
        .and_then(|b| b.get("answer").or_else(|| b.get("snippet")))
        .and_then(Value::as_str);
    if let Some(answer) = answer {
        out["answer"] = Value::String(answer.to_string());
    }
    out
}

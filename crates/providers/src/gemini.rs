use async_trait::async_trait;
use dalal_core::types::{ChatMessage, LLMResponse, ToolCallRequest};
use dalal_core::{Error, Result};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, error, info};

use crate::Provider;

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

pub struct GeminiProvider {
    client: Client,
    api_key: String,
    api_base: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
}

impl GeminiProvider {
    pub fn new(
        api_key: &str,
        api_base: Option<&str>,
        model: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.to_string(),
            api_base: api_base
                .unwrap_or(GEMINI_API_BASE)
                .trim_end_matches('/')
                .to_string(),
            model: model.to_string(),
            max_tokens,
            temperature,
        }
    }

    /// Config stores "gemini/gemini-2.0-flash"; the API expects "gemini-2.0-flash".
    fn normalize_model(model: &str) -> &str {
        model.strip_prefix("gemini/").unwrap_or(model)
    }

    /// Split off the system instruction and map the rest onto `user`/`model` turns.
    fn convert_messages(messages: &[ChatMessage]) -> (Option<String>, Vec<Value>) {
        let mut system_text: Option<String> = None;
        let mut contents: Vec<Value> = Vec::new();

        for msg in messages {
            match msg.role.as_str() {
                "system" => {
                    let text = msg.text().to_string();
                    system_text = Some(match system_text {
                        Some(existing) => format!("{}\n\n{}", existing, text),
                        None => text,
                    });
                }
                "assistant" => {
                    let mut parts: Vec<Value> = Vec::new();
                    if !msg.text().is_empty() {
                        parts.push(json!({"text": msg.text()}));
                    }
                    for tc in msg.tool_calls.iter().flatten() {
                        parts.push(json!({
                            "functionCall": {
                                "name": tc.name,
                                "args": tc.arguments,
                            }
                        }));
                    }
                    if parts.is_empty() {
                        parts.push(json!({"text": ""}));
                    }
                    contents.push(json!({"role": "model", "parts": parts}));
                }
                "tool" => {
                    // Gemini matches responses to calls by function name, not by id.
                    let name = msg
                        .name
                        .as_deref()
                        .or(msg.tool_call_id.as_deref())
                        .unwrap_or_default();
                    let result_text = msg.text();
                    let response = match serde_json::from_str::<Value>(result_text) {
                        Ok(v @ Value::Object(_)) => v,
                        _ => json!({"result": result_text}),
                    };
                    let part = json!({
                        "functionResponse": {
                            "name": name,
                            "response": response,
                        }
                    });

                    // Consecutive function responses share one user turn.
                    let merged = contents
                        .last_mut()
                        .filter(|last| last["role"] == "user")
                        .and_then(|last| last["parts"].as_array_mut())
                        .filter(|parts| parts.first().and_then(|p| p.get("functionResponse")).is_some())
                        .map(|parts| parts.push(part.clone()))
                        .is_some();
                    if !merged {
                        contents.push(json!({"role": "user", "parts": [part]}));
                    }
                }
                _ => {
                    contents.push(json!({"role": "user", "parts": [{"text": msg.text()}]}));
                }
            }
        }

        (system_text, contents)
    }

    /// OpenAI-style tool schemas to Gemini function declarations.
    fn convert_tools(tools: &[Value]) -> Vec<Value> {
        let declarations: Vec<Value> = tools
            .iter()
            .filter_map(|tool| {
                let func = tool.get("function")?;
                let name = func.get("name")?.as_str()?;
                let description = func.get("description").and_then(|v| v.as_str()).unwrap_or("");
                let mut declaration = json!({"name": name, "description": description});
                // Gemini rejects an object schema with no properties.
                if let Some(params) = func.get("parameters") {
                    let has_properties = params
                        .get("properties")
                        .and_then(|p| p.as_object())
                        .map(|p| !p.is_empty())
                        .unwrap_or(false);
                    if has_properties {
                        declaration["parameters"] = params.clone();
                    }
                }
                Some(declaration)
            })
            .collect();

        if declarations.is_empty() {
            vec![]
        } else {
            vec![json!({"functionDeclarations": declarations})]
        }
    }

    fn parse_response(raw_body: &str) -> Result<LLMResponse> {
        let resp: GeminiResponse = serde_json::from_str(raw_body).map_err(|e| {
            Error::Provider(format!(
                "Failed to parse Gemini response: {}. Body: {}",
                e,
                raw_body.chars().take(500).collect::<String>()
            ))
        })?;

        let candidate = resp
            .candidates
            .and_then(|c| c.into_iter().next())
            .ok_or_else(|| Error::Provider("No candidates in Gemini response".to_string()))?;

        let mut text_parts: Vec<String> = Vec::new();
        let mut tool_calls: Vec<ToolCallRequest> = Vec::new();

        for (i, part) in candidate.content.map(|c| c.parts).unwrap_or_default().into_iter().enumerate() {
            if let Some(text) = part.text.filter(|t| !t.is_empty()) {
                text_parts.push(text);
            }
            if let Some(fc) = part.function_call {
                tool_calls.push(ToolCallRequest {
                    id: format!("gemini_call_{}", i),
                    name: fc.name,
                    arguments: fc.args.unwrap_or_else(|| Value::Object(serde_json::Map::new())),
                });
            }
        }

        let content = (!text_parts.is_empty()).then(|| text_parts.join("\n"));

        let finish_reason = match candidate.finish_reason.as_deref() {
            _ if !tool_calls.is_empty() => "tool_calls".to_string(),
            Some("STOP") | None => "stop".to_string(),
            Some("MAX_TOKENS") => "length".to_string(),
            Some("SAFETY") => "content_filter".to_string(),
            Some(other) => other.to_lowercase(),
        };

        let usage = resp
            .usage_metadata
            .map(|meta| {
                json!({
                    "prompt_tokens": meta.prompt_token_count,
                    "completion_tokens": meta.candidates_token_count,
                })
            })
            .unwrap_or(Value::Null);

        Ok(LLMResponse {
            content,
            tool_calls,
            finish_reason,
            usage,
        })
    }
}

#[async_trait]
impl Provider for GeminiProvider {
    async fn chat(&self, messages: &[ChatMessage], tools: &[Value]) -> Result<LLMResponse> {
        let model = Self::normalize_model(&self.model);
        let url = format!("{}/models/{}:generateContent", self.api_base, model);

        let (system_instruction, contents) = Self::convert_messages(messages);
        let gemini_tools = Self::convert_tools(tools);

        let mut request = json!({
            "contents": contents,
            "generationConfig": {
                "temperature": self.temperature,
                "maxOutputTokens": self.max_tokens,
            }
        });
        if let Some(sys) = &system_instruction {
            request["systemInstruction"] = json!({"parts": [{"text": sys}]});
        }
        if !gemini_tools.is_empty() {
            request["tools"] = Value::Array(gemini_tools);
        }

        info!(
            model = %model,
            tools_count = tools.len(),
            messages_count = messages.len(),
            "Calling Gemini API"
        );

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Provider(format!("Gemini request failed: {}", e)))?;

        let status = response.status();
        let raw_body = response.text().await.unwrap_or_default();

        if !status.is_success() {
            error!(status = %status, body = %raw_body, "Gemini API error");
            return Err(Error::Provider(format!("Gemini API error {}: {}", status, raw_body)));
        }

        debug!(body_len = raw_body.len(), "Gemini raw response");
        let parsed = Self::parse_response(&raw_body)?;

        info!(
            content_len = parsed.content.as_ref().map(|c| c.len()).unwrap_or(0),
            tool_calls_count = parsed.tool_calls.len(),
            finish_reason = %parsed.finish_reason,
            "Gemini response parsed"
        );
        Ok(parsed)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    candidates: Option<Vec<GeminiCandidate>>,
    usage_metadata: Option<GeminiUsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    content: Option<GeminiContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPart {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    function_call: Option<GeminiFunctionCall>,
}

#[derive(Debug, Deserialize)]
struct GeminiFunctionCall {
    name: String,
    args: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiUsageMetadata {
    prompt_token_count: Option<u64>,
    candidates_token_count: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_model() {
        assert_eq!(GeminiProvider::normalize_model("gemini/gemini-2.0-flash"), "gemini-2.0-flash");
        assert_eq!(GeminiProvider::normalize_model("gemini-1.5-pro"), "gemini-1.5-pro");
    }

    #[test]
    fn test_convert_messages() {
        let messages = vec![
            ChatMessage::system("You are an NSE data analyst"),
            ChatMessage::user("Price of TCS?"),
            ChatMessage::assistant_tool_calls(Some("Looking it up"), vec![]),
        ];
        let (system, contents) = GeminiProvider::convert_messages(&messages);
        assert_eq!(system.as_deref(), Some("You are an NSE data analyst"));
        assert_eq!(contents.len(), 2);
        assert_eq!(contents[0]["role"], "user");
        assert_eq!(contents[1]["role"], "model");
    }

    #[test]
    fn test_convert_tools_drops_empty_parameters() {
        let tools = vec![
            json!({"type": "function", "function": {
                "name": "get_stock_details",
                "description": "Stock details",
                "parameters": {"type": "object", "properties": {"symbol": {"type": "string"}}, "required": ["symbol"]}
            }}),
            json!({"type": "function", "function": {
                "name": "get_trending_stocks",
                "description": "Trending",
                "parameters": {"type": "object", "properties": {}}
            }}),
        ];
        let converted = GeminiProvider::convert_tools(&tools);
        let declarations = converted[0]["functionDeclarations"].as_array().unwrap();
        assert_eq!(declarations.len(), 2);
        assert_eq!(declarations[0]["parameters"]["required"][0], "symbol");
        assert!(declarations[1].get("parameters").is_none());
        assert!(GeminiProvider::convert_tools(&[]).is_empty());
    }

    #[test]
    fn test_tool_results_use_function_name() {
        let calls = vec![
            ToolCallRequest {
                id: "gemini_call_0".to_string(),
                name: "get_stock_details".to_string(),
                arguments: json!({"symbol": "TCS"}),
            },
            ToolCallRequest {
                id: "gemini_call_1".to_string(),
                name: "get_trending_stocks".to_string(),
                arguments: json!({}),
            },
        ];
        let messages = vec![
            ChatMessage::user("TCS and trending"),
            ChatMessage::assistant_tool_calls(None, calls),
            ChatMessage::tool_result("gemini_call_0", "get_stock_details", "📈 COMPREHENSIVE STOCK ANALYSIS: TCS"),
            ChatMessage::tool_result("gemini_call_1", "get_trending_stocks", "Trending Stocks:"),
        ];

        let (_system, contents) = GeminiProvider::convert_messages(&messages);
        assert_eq!(contents.len(), 3);
        assert_eq!(contents[1]["parts"][0]["functionCall"]["name"], "get_stock_details");
        let parts = contents[2]["parts"].as_array().unwrap();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0]["functionResponse"]["name"], "get_stock_details");
        assert_eq!(parts[0]["functionResponse"]["response"]["result"], "📈 COMPREHENSIVE STOCK ANALYSIS: TCS");
        assert_eq!(parts[1]["functionResponse"]["name"], "get_trending_stocks");
    }

    #[test]
    fn test_parse_text_response() {
        let raw = r#"{
            "candidates": [{
                "content": {"parts": [{"text": "TCS trades at ₹3,500."}], "role": "model"},
                "finishReason": "STOP"
            }],
            "usageMetadata": {"promptTokenCount": 10, "candidatesTokenCount": 5}
        }"#;
        let resp = GeminiProvider::parse_response(raw).unwrap();
        assert_eq!(resp.content.as_deref(), Some("TCS trades at ₹3,500."));
        assert!(resp.tool_calls.is_empty());
        assert_eq!(resp.finish_reason, "stop");
        assert_eq!(resp.usage["prompt_tokens"], 10);
    }

    #[test]
    fn test_parse_function_call_response() {
        let raw = r#"{
            "candidates": [{
                "content": {"parts": [
                    {"functionCall": {"name": "get_historical_data", "args": {"symbol": "INFY", "period": "3M"}}}
                ], "role": "model"},
                "finishReason": "STOP"
            }]
        }"#;
        let resp = GeminiProvider::parse_response(raw).unwrap();
        assert_eq!(resp.finish_reason, "tool_calls");
        assert_eq!(resp.tool_calls.len(), 1);
        assert_eq!(resp.tool_calls[0].name, "get_historical_data");
        assert_eq!(resp.tool_calls[0].arguments["period"], "3M");
        assert!(resp.content.is_none());
    }

    #[test]
    fn test_parse_without_candidates() {
        assert!(GeminiProvider::parse_response(r#"{"promptFeedback": {}}"#).is_err());
        assert!(GeminiProvider::parse_response("not json").is_err());
    }
}

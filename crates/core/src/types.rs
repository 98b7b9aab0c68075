/// A function call requested by the model.
#[derive(Debug, Clone)]
pub struct ToolCallRequest {
    pub id: String,
    pub name: String,
    pub arguments: serde_json::Value,
}

#[derive(Debug, Clone)]
pub struct LLMResponse {
    pub content: Option<String>,
    pub tool_calls: Vec<ToolCallRequest>,
    pub finish_reason: String,
    pub usage: serde_json::Value,
}

impl Default for LLMResponse {
    fn default() -> Self {
        Self {
            content: None,
            tool_calls: Vec::new(),
            finish_reason: String::new(),
            usage: serde_json::Value::Null,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub role: String,
    pub content: serde_json::Value,
    pub tool_calls: Option<Vec<ToolCallRequest>>,
    pub tool_call_id: Option<String>,
    /// Tool name on `tool` messages; Gemini needs it for `functionResponse`.
    pub name: Option<String>,
}

impl ChatMessage {
    fn with_role(role: &str, content: &str) -> Self {
        Self {
            role: role.to_string(),
            content: serde_json::Value::String(content.to_string()),
            tool_calls: None,
            tool_call_id: None,
            name: None,
        }
    }

    pub fn system(content: &str) -> Self {
        Self::with_role("system", content)
    }

    pub fn user(content: &str) -> Self {
        Self::with_role("user", content)
    }

    pub fn assistant_tool_calls(content: Option<&str>, calls: Vec<ToolCallRequest>) -> Self {
        let mut msg = Self::with_role("assistant", content.unwrap_or_default());
        msg.tool_calls = Some(calls);
        msg
    }

    pub fn tool_result(tool_call_id: &str, tool_name: &str, content: &str) -> Self {
        let mut msg = Self::with_role("tool", content);
        msg.tool_call_id = Some(tool_call_id.to_string());
        msg.name = Some(tool_name.to_string());
        msg
    }

    pub fn text(&self) -> &str {
        self.content.as_str().unwrap_or_default()
    }
}

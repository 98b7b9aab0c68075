use dalal_core::config::AgentDefaults;
use dalal_core::types::{ChatMessage, ToolCallRequest};
use dalal_core::{Error, Result};
use dalal_providers::Provider;
use dalal_tools::{result_text, ToolContext, ToolRegistry};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Runs one stage: chat, execute requested tools, feed results back, repeat.
#[derive(Clone)]
pub struct StageRunner {
    provider: Arc<dyn Provider>,
    registry: Arc<ToolRegistry>,
    ctx: ToolContext,
    max_tool_iterations: u32,
    llm_max_retries: u32,
    llm_retry_delay_ms: u64,
}

impl StageRunner {
    pub fn new(
        provider: Arc<dyn Provider>,
        registry: Arc<ToolRegistry>,
        ctx: ToolContext,
        defaults: &AgentDefaults,
    ) -> Self {
        Self {
            provider,
            registry,
            ctx,
            max_tool_iterations: defaults.max_tool_iterations.max(1),
            llm_max_retries: defaults.llm_max_retries,
            llm_retry_delay_ms: defaults.llm_retry_delay_ms,
        }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    async fn chat_with_retry(
        &self,
        messages: &[ChatMessage],
        tools: &[serde_json::Value],
        iteration: u32,
    ) -> Result<dalal_core::types::LLMResponse> {
        let mut last_error = None;
        for attempt in 0..=self.llm_max_retries {
            if attempt > 0 {
                let delay_ms = self.llm_retry_delay_ms * (1u64 << (attempt - 1).min(4));
                warn!(attempt, delay_ms, iteration, "Retrying LLM call");
                tokio::time::sleep(std::time::Duration::from_millis(delay_ms)).await;
            }
            match self.provider.chat(messages, tools).await {
                Ok(r) => return Ok(r),
                Err(e) => {
                    warn!(error = %e, attempt, iteration, "LLM call failed");
                    last_error = Some(e);
                }
            }
        }
        Err(last_error.unwrap_or_else(|| Error::Provider("LLM call failed".to_string())))
    }

    async fn execute_tool_call(&self, tool_call: &ToolCallRequest) -> String {
        let start = std::time::Instant::now();
        let result = self
            .registry
            .execute(&tool_call.name, self.ctx.clone(), tool_call.arguments.clone())
            .await;
        let duration_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok(value) => {
                info!(tool = %tool_call.name, duration_ms, "Tool call finished");
                result_text(&value)
            }
            Err(e) => {
                warn!(tool = %tool_call.name, duration_ms, error = %e, "Tool call failed");
                format!("Error: {}", e)
            }
        }
    }

    /// Run one stage to completion and return the model's final text.
    pub async fn run(&self, system: &str, user: &str, tool_names: &[String]) -> Result<String> {
        let names: Vec<&str> = tool_names.iter().map(String::as_str).collect();
        let tools = self.registry.get_filtered_schemas(&names);
        let mut messages = vec![ChatMessage::system(system), ChatMessage::user(user)];
        let mut last_content: Option<String> = None;

        for iteration in 0..self.max_tool_iterations {
            debug!(iteration, "LLM call iteration");
            let response = self.chat_with_retry(&messages, &tools, iteration).await?;

            info!(
                content_len = response.content.as_ref().map(|c| c.len()).unwrap_or(0),
                tool_calls_count = response.tool_calls.len(),
                finish_reason = %response.finish_reason,
                "LLM response received"
            );

            if response.tool_calls.is_empty() {
                return Ok(response.content.unwrap_or_default());
            }

            messages.push(ChatMessage::assistant_tool_calls(
                response.content.as_deref(),
                response.tool_calls.clone(),
            ));
            for tool_call in &response.tool_calls {
                let result = self.execute_tool_call(tool_call).await;
                messages.push(ChatMessage::tool_result(&tool_call.id, &tool_call.name, &result));
            }
            if response.content.is_some() {
                last_content = response.content;
            }
        }

        warn!(max = self.max_tool_iterations, "Reached max tool iterations");
        Ok(last_content.unwrap_or_else(|| {
            "I've reached the maximum number of tool iterations.".to_string()
        }))
    }
}

use dalal_core::Paths;
use dalal_tools::{result_text, ToolContext, ToolRegistry};
use serde_json::Value;

/// Run a direct tool call, bypassing the LLM.
pub async fn tool(tool_name: &str, params_json: &str) -> anyhow::Result<()> {
    let registry = ToolRegistry::with_defaults();
    let config = super::load_config(&Paths::new())?;

    let tool = registry.get(tool_name).ok_or_else(|| {
        anyhow::anyhow!("Tool '{}' not found. Use `dalal tools` to see available tools.", tool_name)
    })?;

    let params: Value = serde_json::from_str(params_json)
        .map_err(|e| anyhow::anyhow!("Failed to parse JSON params: {}\nInput: {}", e, params_json))?;

    if let Err(e) = tool.validate(&params) {
        anyhow::bail!(
            "Parameter validation failed: {}\nUse `dalal tools --info {}` for parameter details.",
            e,
            tool_name
        );
    }

    let result = tool.execute(ToolContext::from_config(config), params).await?;
    println!("{}", result_text(&result));
    Ok(())
}

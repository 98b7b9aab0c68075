use dalal_tools::ToolRegistry;
use serde_json::Value;

/// List all registered tools.
pub async fn list() -> anyhow::Result<()> {
    let registry = ToolRegistry::with_defaults();
    let names = registry.tool_names();

    println!();
    println!("🔧 Registered tools ({} total)", names.len());
    println!();

    for name in &names {
        let Some(tool) = registry.get(name) else { continue };
        let desc = tool.schema().description;
        let short_desc: String = desc.chars().take(60).collect();
        let ellipsis = if desc.chars().count() > 60 { "..." } else { "" };
        println!("  {:<24} {}{}", name, short_desc, ellipsis);
    }
    println!();
    Ok(())
}

/// Show detailed info for a specific tool.
pub async fn info(tool_name: &str) -> anyhow::Result<()> {
    let registry = ToolRegistry::with_defaults();
    let tool = registry.get(tool_name).ok_or_else(|| {
        anyhow::anyhow!("Tool '{}' not found. Use `dalal tools` to see available tools.", tool_name)
    })?;
    let schema = tool.schema();

    println!();
    println!("🔧 {}", schema.name);
    println!();
    println!("  Description: {}", schema.description);
    println!();

    let required: Vec<&str> = schema.parameters["required"]
        .as_array()
        .map(|arr| arr.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();
    match schema.parameters["properties"].as_object() {
        Some(props) if !props.is_empty() => {
            println!("  Parameters:");
            for (name, prop) in props {
                let marker = if required.contains(&name.as_str()) { " (required)" } else { "" };
                println!(
                    "    {:<12} {}{}  {}",
                    name,
                    prop["type"].as_str().unwrap_or("any"),
                    marker,
                    prop["description"].as_str().unwrap_or("")
                );
            }
        }
        _ => println!("  Parameters: none"),
    }
    println!();
    Ok(())
}

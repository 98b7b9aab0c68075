use dalal_agent::CrewSpec;
use dalal_core::Paths;
use dalal_tools::{MarketClient, MarketData, ToolRegistry};

/// Run environment diagnostics.
pub async fn run(ping: bool) -> anyhow::Result<()> {
    let paths = Paths::new();

    println!();
    println!("🩺 dalal doctor - Environment Diagnostics");
    println!("================================");
    println!();

    let mut ok_count = 0u32;
    let mut warn_count = 0u32;
    let mut err_count = 0u32;

    // --- 1. Config ---
    println!("📋 Configuration");
    if paths.config_file().exists() {
        print_ok("Config file exists", &paths.config_file().display().to_string());
        ok_count += 1;
    } else {
        print_warn("Config file not found", "Run `dalal onboard` to create one; using defaults");
        warn_count += 1;
    }

    let config = super::load_config(&paths)?;
    println!("  Model: {}", config.agents.defaults.model);

    if config.llm_key_configured() {
        print_ok("LLM API key configured", config.model_provider());
        ok_count += 1;
    } else {
        print_err("No LLM API key configured", "Set GEMINI_API_KEY or providers.gemini.apiKey");
        err_count += 1;
    }

    if config.market.api_key.is_empty() {
        print_err("No market-data API key", "Set INDIAN_API_KEY or market.apiKey");
        err_count += 1;
    } else {
        print_ok("Market-data API key configured", &config.market.api_base);
        ok_count += 1;
    }

    if config.tools.web.search.api_key.is_empty() {
        print_warn("No web search API key", "Set SERPER_API_KEY; the researcher stage will get errors");
        warn_count += 1;
    } else {
        print_ok("Web search API key configured", "");
        ok_count += 1;
    }
    println!();

    // --- 2. Tools & crew ---
    println!("🔧 Tools");
    let registry = ToolRegistry::with_defaults();
    print_ok(&format!("{} tools registered", registry.tool_names().len()), "");
    ok_count += 1;

    let crew_source = if paths.crew_file().exists() {
        paths.crew_file().display().to_string()
    } else {
        "built-in".to_string()
    };
    match CrewSpec::load_or_default(&paths).and_then(|crew| crew.validate(&registry).map(|_| crew)) {
        Ok(crew) => {
            print_ok(
                &format!("Crew valid ({} agents, {} tasks)", crew.agents.len(), crew.tasks.len()),
                &crew_source,
            );
            ok_count += 1;
        }
        Err(e) => {
            print_err(&format!("Crew invalid: {}", e), &crew_source);
            err_count += 1;
        }
    }
    println!();

    // --- 3. Market API ---
    if ping {
        println!("🌐 Market API");
        let client = MarketClient::from_config(&config.market);
        match client.fetch("trending", &[]).await {
            Ok(_) => {
                print_ok("trending endpoint reachable", client.base_url());
                ok_count += 1;
            }
            Err(e) => {
                print_err("trending endpoint failed", &e.to_string());
                err_count += 1;
            }
        }
        println!();
    }

    println!("================================");
    println!("  ✅ {} ok   ⚠️  {} warnings   ❌ {} errors", ok_count, warn_count, err_count);
    println!();
    Ok(())
}

fn print_ok(label: &str, detail: &str) {
    if detail.is_empty() {
        println!("  ✅ {}", label);
    } else {
        println!("  ✅ {} - {}", label, detail);
    }
}

fn print_warn(label: &str, hint: &str) {
    if hint.is_empty() {
        println!("  ⚠️  {}", label);
    } else {
        println!("  ⚠️  {} - {}", label, hint);
    }
}

fn print_err(label: &str, hint: &str) {
    if hint.is_empty() {
        println!("  ❌ {}", label);
    } else {
        println!("  ❌ {} - {}", label, hint);
    }
}

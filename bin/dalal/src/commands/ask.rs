use dalal_agent::{answer, Pipeline};
use dalal_core::Paths;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::error;

const EXAMPLES: [&str; 4] = [
    "Tell me about Reliance stock",
    "LIC IPO performance",
    "Top gainers today",
    "Current price of TCS",
];

/// Rendered answer, or an apology carrying the failure.
pub(crate) async fn answer_text(pipeline: &dyn Pipeline, question: &str) -> String {
    match pipeline.kickoff(question).await {
        Ok(text) => answer::render(&text),
        Err(e) => {
            error!(error = %e, "Pipeline failed");
            format!(
                "I apologize, but I encountered an error while processing your request: {}",
                e
            )
        }
    }
}

fn print_banner() {
    println!("🚀 NSE Stock Market Analysis System");
    println!("📊 Ask any question about Indian stocks, IPOs, or market data");
    println!("💡 Examples:");
    for example in EXAMPLES {
        println!("   - '{}'", example);
    }
    println!("Type 'quit' or 'exit' to leave.");
    println!("{}", "-".repeat(60));
}

pub async fn run(message: Option<String>) -> anyhow::Result<()> {
    let paths = Paths::new();
    let config = super::load_config(&paths)?;
    let pipeline = super::build_pipeline(&config, &paths)?;

    if let Some(question) = message {
        println!("{}", answer_text(pipeline.as_ref(), &question).await);
        return Ok(());
    }

    print_banner();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("\n🤔 Your question: ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let question = line.trim();
        if question.is_empty() {
            continue;
        }
        if question.eq_ignore_ascii_case("quit") || question.eq_ignore_ascii_case("exit") {
            break;
        }

        println!("\n🔍 Analyzing: {}", question);
        println!("{}", "-".repeat(60));
        println!("{}", answer_text(pipeline.as_ref(), question).await);
    }

    println!("👋 Bye");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use dalal_core::Error;

    struct Fixed(std::result::Result<&'static str, &'static str>);

    #[async_trait]
    impl Pipeline for Fixed {
        async fn kickoff(&self, _question: &str) -> dalal_core::Result<String> {
            self.0
                .map(str::to_string)
                .map_err(|e| Error::Pipeline(e.to_string()))
        }
    }

    #[tokio::test]
    async fn test_answer_is_rendered() {
        let raw = "```json\n{\"insights\": \"TCS looks steady\", \"additional_info\": {\"market_data\": {\"current_price_nse\": \"3500\"}}}\n```";
        let out = answer_text(&Fixed(Ok(raw)), "TCS?").await;
        assert!(out.starts_with("TCS looks steady"));
        assert!(out.contains("₹3500"));
    }

    #[tokio::test]
    async fn test_failure_becomes_apology() {
        let out = answer_text(&Fixed(Err("stage blew up")), "TCS?").await;
        assert!(out.starts_with("I apologize, but I encountered an error while processing your request: "));
        assert!(out.contains("stage blew up"));
    }
}

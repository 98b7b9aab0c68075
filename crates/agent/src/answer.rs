//! Final answers may end with a fenced JSON block carrying the prose answer
//! and a market-data panel; the CLI renders that block when present.

use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use std::sync::OnceLock;

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct MarketSnapshot {
    pub current_price_nse: Option<Value>,
    pub current_price_bse: Option<Value>,
    pub daily_change: Option<Value>,
    #[serde(rename = "52_week_high")]
    pub week_52_high: Option<Value>,
    #[serde(rename = "52_week_low")]
    pub week_52_low: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct AdditionalInfo {
    market_data: Option<MarketSnapshot>,
}

#[derive(Debug, Clone, Deserialize)]
struct RawAnswer {
    insights: Option<String>,
    additional_info: Option<AdditionalInfo>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StructuredAnswer {
    pub insights: String,
    pub market_data: Option<MarketSnapshot>,
}

fn json_block() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)```json\s*(\{.*?\})\s*```").expect("valid regex"))
}

/// Extract the structured block, if the answer has a parseable one.
pub fn parse(answer: &str) -> Option<StructuredAnswer> {
    let captures = json_block().captures(answer)?;
    let raw: RawAnswer = serde_json::from_str(captures.get(1)?.as_str()).ok()?;
    Some(StructuredAnswer {
        insights: raw.insights.unwrap_or_default(),
        market_data: raw.additional_info.and_then(|i| i.market_data),
    })
}

fn display(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn panel(data: &MarketSnapshot) -> Vec<String> {
    let mut lines = Vec::new();
    let rupee = |label: &str, value: &Option<Value>, lines: &mut Vec<String>| {
        if let Some(v) = value {
            lines.push(format!("  {:<13} ₹{}", label, display(v)));
        }
    };
    rupee("NSE Price:", &data.current_price_nse, &mut lines);
    rupee("BSE Price:", &data.current_price_bse, &mut lines);
    if let Some(change) = &data.daily_change {
        let change = display(change);
        let arrow = if change.trim_start().starts_with('-') { "▼" } else { "▲" };
        lines.push(format!("  {:<13} {} {}", "Daily Change:", change, arrow));
    }
    rupee("52W High:", &data.week_52_high, &mut lines);
    rupee("52W Low:", &data.week_52_low, &mut lines);
    lines
}

/// Terminal rendering: insights plus a market-data panel, or the text as is.
pub fn render(answer: &str) -> String {
    let Some(parsed) = parse(answer) else {
        return answer.to_string();
    };

    let mut out = parsed.insights.trim().to_string();
    if let Some(data) = &parsed.market_data {
        let lines = panel(data);
        if !lines.is_empty() {
            out.push_str("\n\n📊 Market Data\n");
            out.push_str(&lines.join("\n"));
        }
    }
    out
}

use serde_json::Value;

use super::report::{field, is_truthy, text, Report};
use super::FormatResult;

const MAX_BULLISH: usize = 8;
const MAX_NEUTRAL: usize = 5;
const MAX_BEARISH: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rating {
    Bullish,
    Neutral,
    Bearish,
    Unrated,
}

/// `None` when `activeStockTrends` is present but not an object; such rows
/// count toward the total only. A missing key is an empty object.
fn classify(stock: &Value) -> Option<Rating> {
    let rating = match stock.get("activeStockTrends") {
        None => None,
        Some(Value::Object(trends)) => trends.get("overallRating"),
        Some(_) => return None,
    };
    if !is_truthy(rating) {
        return Some(Rating::Unrated);
    }
    let label = text(rating);
    let rating = if label.contains("Bullish") {
        Rating::Bullish
    } else if label.contains("Bearish") {
        Rating::Bearish
    } else if label != "N/A" && label != "NA" {
        Rating::Neutral
    } else {
        Rating::Unrated
    };
    Some(rating)
}

fn stock_entry(report: &mut Report, stock: &Value, index: usize) {
    report.line(format!("{}. {}", index, field(stock, "commonName")));
    report.line(format!(
        "   NSE: {} | BSE: {}",
        field(stock, "exchangeCodeNsi"),
        field(stock, "exchangeCodeBse")
    ));
    report.line(format!("   Industry: {}", field(stock, "mgIndustry")));
    report.line(format!("   Sector: {}", field(stock, "mgSector")));
    if let Some(trends) = stock.get("activeStockTrends").filter(|t| t.is_object()) {
        report.line(format!(
            "   Trends: Short-term: {} | Long-term: {}",
            field(trends, "shortTermTrends"),
            field(trends, "longTermTrends")
        ));
        report.line(format!("   Overall Rating: {}", field(trends, "overallRating")));
    }
    report.rule("   ", 40);
}

fn bucket(report: &mut Report, heading: &str, stocks: &[&Value], cap: usize) {
    if stocks.is_empty() {
        return;
    }
    report.section(heading);
    for (i, stock) in stocks.iter().take(cap).enumerate() {
        stock_entry(report, stock, i + 1);
    }
    report.blank();
}

pub(super) fn render(data: &Value, query: &str) -> FormatResult {
    let mut report = Report::new();
    report.banner(&format!("🔍 INDUSTRY SEARCH RESULTS: '{}'", query.to_uppercase()));

    if let Some(stocks) = data.as_array() {
        let mut bullish = Vec::new();
        let mut neutral = Vec::new();
        let mut bearish = Vec::new();
        let mut unrated = 0usize;

        for stock in stocks.iter().filter(|s| s.is_object()) {
            match classify(stock) {
                Some(Rating::Bullish) => bullish.push(stock),
                Some(Rating::Neutral) => neutral.push(stock),
                Some(Rating::Bearish) => bearish.push(stock),
                Some(Rating::Unrated) => unrated += 1,
                None => {}
            }
        }

        bucket(&mut report, "🟢 BULLISH RECOMMENDATIONS", &bullish, MAX_BULLISH);
        bucket(&mut report, "🟡 NEUTRAL RECOMMENDATIONS", &neutral, MAX_NEUTRAL);
        bucket(&mut report, "🔴 BEARISH RECOMMENDATIONS", &bearish, MAX_BEARISH);

        report.section("📊 SUMMARY STATISTICS");
        report.line(format!("Total Stocks Found: {}", stocks.len()));
        report.line(format!("Bullish Recommendations: {}", bullish.len()));
        report.line(format!("Neutral Recommendations: {}", neutral.len()));
        report.line(format!("Bearish Recommendations: {}", bearish.len()));
        report.line(format!("No Rating Available: {}", unrated));
    }

    Ok(report.close())
}

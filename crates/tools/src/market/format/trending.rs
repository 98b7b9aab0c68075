use serde_json::Value;

use super::report::{field, Report};
use super::{FormatError, FormatResult};

const MAX_TRENDING: usize = 10;

pub(super) fn render(data: &Value) -> FormatResult {
    let mut report = Report::new();
    report.line("Trending Stocks:").blank();

    if let Some(stocks) = data.as_array() {
        for (i, stock) in stocks.iter().take(MAX_TRENDING).enumerate() {
            if !stock.is_object() {
                return Err(FormatError::shape(format!("trending[{}]", i), "an object", stock));
            }
            report.line(format!("{}. {}", i + 1, field(stock, "symbol")));
            report.line(format!("   Company: {}", field(stock, "company_name")));
            report.line(format!("   Price: ₹{}", field(stock, "price")));
            report.line(format!(
                "   Change: {} ({}%)",
                field(stock, "change"),
                field(stock, "change_percent")
            ));
            report.line(format!("   Volume: {}", field(stock, "volume")));
            report.line(format!("   Trend: {}", field(stock, "trend")));
            report.rule("", 40);
        }
    }

    Ok(report.finish())
}

use serde_json::Value;

use super::report::{field, Report};
use super::FormatResult;

pub(super) fn render(data: &Value, stock_id: &str) -> FormatResult {
    let mut report = Report::new();
    report.line(format!("Stock Target Price for ID {}:", stock_id)).blank();

    if data.is_object() {
        report.line(format!("Company Name: {}", field(data, "company_name")));
        report.line(format!("Symbol: {}", field(data, "symbol")));
        report.line(format!("Current Price: ₹{}", field(data, "current_price")));
        report.line(format!("Target Price: ₹{}", field(data, "target_price")));
        report.line(format!("Upside Potential: {}%", field(data, "upside_potential")));
        report.line(format!("Analyst Rating: {}", field(data, "analyst_rating")));
        report.line(format!("Number of Analysts: {}", field(data, "analyst_count")));
        report.line(format!("High Target: ₹{}", field(data, "high_target")));
        report.line(format!("Low Target: ₹{}", field(data, "low_target")));
        report.line(format!("Mean Target: ₹{}", field(data, "mean_target")));
    }

    Ok(report.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_flat_report() {
        let data = json!({"company_name": "Reliance", "symbol": "RELIANCE", "target_price": 3200, "analyst_count": 31});
        let out = render(&data, "RELIANCE").unwrap();
        assert!(out.starts_with("Stock Target Price for ID RELIANCE:\n\n"));
        assert!(out.contains("Target Price: ₹3200\n"));
        assert!(out.contains("Number of Analysts: 31\n"));
        assert!(out.contains("Upside Potential: N/A%\n"));
        assert!(out.ends_with("Mean Target: ₹N/A\n"));
    }
}

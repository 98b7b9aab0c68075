use serde_json::Value;

use super::report::{field, Report};
use super::{FormatError, FormatResult};

const MAX_POINTS: usize = 10;

pub(super) fn render(data: &Value, symbol: &str, period: &str) -> FormatResult {
    let mut report = Report::new();
    report.line(format!("Historical Data for {} ({}):", symbol, period)).blank();

    if let Some(points) = data.as_array() {
        let tail = &points[points.len().saturating_sub(MAX_POINTS)..];
        for (i, point) in tail.iter().enumerate() {
            if !point.is_object() {
                return Err(FormatError::shape("historical point", "an object", point));
            }
            report.line(format!("{}. Date: {}", i + 1, field(point, "date")));
            report.line(format!("   Open: ₹{}", field(point, "open")));
            report.line(format!("   High: ₹{}", field(point, "high")));
            report.line(format!("   Low: ₹{}", field(point, "low")));
            report.line(format!("   Close: ₹{}", field(point, "close")));
            report.line(format!("   Volume: {}", field(point, "volume")));
            report.rule("", 30);
        }
    }

    Ok(report.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_last_ten_points_in_order() {
        let points: Vec<Value> = (1..=15)
            .map(|d| json!({"date": format!("2024-01-{:02}", d), "open": d, "close": d, "volume": 1000 * d}))
            .collect();
        let out = render(&Value::Array(points), "RELIANCE", "1M").unwrap();

        assert!(out.starts_with("Historical Data for RELIANCE (1M):\n\n"));
        assert!(out.contains("1. Date: 2024-01-06\n"));
        assert!(out.contains("10. Date: 2024-01-15\n"));
        assert!(!out.contains("2024-01-05"));
        assert!(!out.contains("11. Date"));
        let first = out.find("2024-01-06").unwrap();
        let last = out.find("2024-01-15").unwrap();
        assert!(first < last);
        assert!(out.contains("   High: ₹N/A\n"));
    }

    #[test]
    fn test_short_series_kept_whole() {
        let out = render(&json!([{"date": "d1"}, {"date": "d2"}]), "TCS", "1Y").unwrap();
        assert!(out.contains("1. Date: d1\n"));
        assert!(out.contains("2. Date: d2\n"));
    }

    #[test]
    fn test_non_object_point() {
        assert!(render(&json!([{"date": "d1"}, 7]), "TCS", "1Y").is_err());
    }
}

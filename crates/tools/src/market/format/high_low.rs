use serde_json::Value;

use super::report::{field, Report};
use super::{FormatError, FormatResult};

const MAX_PER_SIDE: usize = 5;

fn side(report: &mut Report, data: &Value, key: &str, heading: &str) -> Result<bool, FormatError> {
    let Some(list) = data.get(key) else {
        return Ok(false);
    };
    let list = list
        .as_array()
        .ok_or_else(|| FormatError::shape(key, "a list", list))?;

    report.line(heading);
    for (i, stock) in list.iter().take(MAX_PER_SIDE).enumerate() {
        if !stock.is_object() {
            return Err(FormatError::shape(format!("{}[{}]", key, i), "an object", stock));
        }
        report.line(format!("{}. {} - ₹{}", i + 1, field(stock, "symbol"), field(stock, "price")));
    }
    Ok(true)
}

pub(super) fn render(data: &Value) -> FormatResult {
    let mut report = Report::new();
    report.line("52-Week High/Low Data:").blank();

    if data.is_object() {
        if side(&mut report, data, "high", "52-Week Highs:")? {
            report.blank();
        }
        side(&mut report, data, "low", "52-Week Lows:")?;
    }

    Ok(report.finish())
}

use serde_json::Value;

use super::report::{field, field_or_empty, is_truthy, non_empty_list, Report};
use super::{FormatError, FormatResult};
use crate::safe_truncate;

const INCOME_KEYS: [&str; 4] = ["TotalRevenue", "NetIncome", "DilutedNormalizedEPS", "OperatingIncome"];
const BALANCE_KEYS: [&str; 3] = ["TotalAssets", "TotalEquity", "TotalDebt"];
const MAX_EXECUTIVES: usize = 5;
const MAX_FISCAL_YEARS: usize = 3;

/// `obj[key]` as an object; absent or null is `None`, anything else is a shape error.
fn optional_object<'a>(obj: &'a Value, key: &str) -> Result<Option<&'a Value>, FormatError> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(v @ Value::Object(_)) => Ok(Some(v)),
        Some(other) => Err(FormatError::shape(key, "an object", other)),
    }
}

pub(super) fn render(data: &Value, symbol: &str) -> FormatResult {
    let mut report = Report::new();
    report.banner(&format!("📈 COMPREHENSIVE STOCK ANALYSIS: {}", symbol));

    if data.is_object() {
        let empty = Value::Object(Default::default());
        let profile = match data.get("companyProfile") {
            None => Some(&empty),
            Some(p) if p.is_object() => Some(p),
            Some(_) => None,
        };

        overview(&mut report, data, profile)?;
        market_data(&mut report, data);
        technicals(&mut report, data);
        if let Some(profile) = profile {
            executives(&mut report, profile)?;
            peers(&mut report, profile);
        }
        financials(&mut report, data)?;
    }

    Ok(report.close())
}

fn overview(report: &mut Report, data: &Value, profile: Option<&Value>) -> Result<(), FormatError> {
    report.section("🏢 COMPANY OVERVIEW");
    report.line(format!("Company Name: {}", field(data, "companyName")));
    report.line(format!("Industry: {}", field(data, "industry")));

    if let Some(profile) = profile {
        report.line(format!("BSE Code: {}", field(profile, "exchangeCodeBse")));
        report.line(format!("NSE Code: {}", field(profile, "exchangeCodeNse")));
        report.line(format!("ISIN: {}", field(profile, "isInId")));

        match profile.get("companyDescription") {
            Some(Value::String(description)) if !description.is_empty() => {
                report.line(format!("Description: {}...", safe_truncate(description, 300)));
            }
            description if is_truthy(description) => {
                let other = description.unwrap_or(&Value::Null);
                return Err(FormatError::shape("companyDescription", "a string", other));
            }
            _ => {}
        }
    }
    Ok(())
}

fn market_data(report: &mut Report, data: &Value) {
    report.blank().section("💰 CURRENT MARKET DATA");
    if let Some(price) = data.get("currentPrice").filter(|p| p.is_object()) {
        report.line(format!("BSE Price: ₹{}", field(price, "BSE")));
        report.line(format!("NSE Price: ₹{}", field(price, "NSE")));
    }
    report.line(format!("Today's Change: {}%", field(data, "percentChange")));
    report.line(format!("52 Week High: ₹{}", field(data, "yearHigh")));
    report.line(format!("52 Week Low: ₹{}", field(data, "yearLow")));
}

fn technicals(report: &mut Report, data: &Value) {
    let Some(points) = non_empty_list(data, "stockTechnicalData") else {
        return;
    };
    report.blank().section("📊 TECHNICAL ANALYSIS (Moving Averages)");
    for point in points.iter().filter(|p| p.is_object()) {
        report.line(format!(
            "  MA {} Days: ₹{}",
            field(point, "days"),
            field(point, "nsePrice")
        ));
    }
}

fn executives(report: &mut Report, profile: &Value) -> Result<(), FormatError> {
    let Some(officers) = optional_object(profile, "officers")? else {
        return Ok(());
    };
    let Some(list) = non_empty_list(officers, "officer") else {
        return Ok(());
    };

    report.blank().section("👥 KEY EXECUTIVES");
    for officer in list.iter().take(MAX_EXECUTIVES).filter(|o| o.is_object()) {
        let title = officer
            .get("title")
            .filter(|t| t.is_object())
            .map(|t| field(t, "Value"))
            .unwrap_or_else(|| "N/A".to_string());
        report.line(format!(
            "  • {} {} - {}",
            field_or_empty(officer, "firstName"),
            field_or_empty(officer, "lastName"),
            title
        ));
    }
    Ok(())
}

fn peers(report: &mut Report, profile: &Value) {
    let Some(list) = non_empty_list(profile, "peerCompanyList") else {
        return;
    };

    report.blank().section("🏭 PEER COMPARISON");
    for (i, peer) in list.iter().enumerate() {
        if !peer.is_object() {
            continue;
        }
        report.line(format!("  {}. {}", i + 1, field(peer, "companyName")));
        report.line(format!(
            "     Price: ₹{} ({}%)",
            field(peer, "price"),
            field(peer, "percentChange")
        ));
        report.line(format!(
            "     Market Cap: ₹{} Cr | P/E: {}",
            field(peer, "marketCap"),
            field(peer, "priceToEarningsValueRatio")
        ));
        report.blank();
    }
}

fn financials(report: &mut Report, data: &Value) -> Result<(), FormatError> {
    let Some(years) = non_empty_list(data, "financials") else {
        return Ok(());
    };

    report.blank().section("📈 FINANCIAL HIGHLIGHTS");
    for (i, year) in years.iter().take(MAX_FISCAL_YEARS).enumerate() {
        if !year.is_object() {
            continue;
        }
        report.blank();
        report.line(format!("Fiscal Year {}:", field(year, "FiscalYear")));

        if let Some(map) = optional_object(year, "stockFinancialMap")? {
            for (name, value, key) in statement_items(map, "INC", &INCOME_KEYS) {
                if key == "DilutedNormalizedEPS" {
                    report.line(format!("  {}: ₹{}", name, value));
                } else {
                    report.line(format!("  {}: ₹{} Cr", name, value));
                }
            }
            for (name, value, _) in statement_items(map, "BAL", &BALANCE_KEYS) {
                report.line(format!("  {}: ₹{} Cr", name, value));
            }
        }

        if i < MAX_FISCAL_YEARS - 1 {
            report.rule("  ", 25);
        }
    }
    Ok(())
}

/// `(displayName, value, key)` of the wanted line items that carry a value.
fn statement_items<'a>(
    map: &'a Value,
    statement: &str,
    wanted: &'a [&'a str],
) -> impl Iterator<Item = (String, String, String)> + 'a {
    map.get(statement)
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter(|item| item.is_object())
        .filter_map(move |item| {
            let key = field_or_empty(item, "key");
            if !wanted.contains(&key.as_str()) {
                return None;
            }
            let value = item.get("value");
            if !is_truthy(value) || value.and_then(Value::as_str) == Some("N/A") {
                return None;
            }
            Some((field_or_empty(item, "displayName"), field(item, "value"), key))
        })
}

use serde_json::Value;

use super::report::{clip, field, Report};
use super::{FormatError, FormatResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Plan {
    DirectGrowth,
    DirectDividend,
    RegularGrowth,
    RegularDividend,
    Other,
}

impl Plan {
    fn of(scheme_name: &str) -> Self {
        let name = scheme_name.to_lowercase();
        let growth = name.contains("growth");
        let dividend = name.contains("dividend") || name.contains("payout");
        if name.contains("direct") {
            if growth {
                return Plan::DirectGrowth;
            }
            if dividend {
                return Plan::DirectDividend;
            }
        }
        if name.contains("regular") {
            if growth {
                return Plan::RegularGrowth;
            }
            if dividend {
                return Plan::RegularDividend;
            }
        }
        Plan::Other
    }

    fn label(&self) -> &'static str {
        match self {
            Plan::DirectGrowth => "Direct Growth",
            Plan::DirectDividend => "Direct Dividend",
            Plan::RegularGrowth => "Regular Growth",
            Plan::RegularDividend => "Regular Dividend",
            Plan::Other => "Other",
        }
    }
}

/// Listing order, heading and display cap of each plan group.
const SECTIONS: [(Plan, &str, usize); 4] = [
    (Plan::DirectGrowth, "🎯 DIRECT GROWTH PLANS (Recommended)", 10),
    (Plan::RegularGrowth, "📈 REGULAR GROWTH PLANS", 8),
    (Plan::DirectDividend, "💵 DIRECT DIVIDEND PLANS", 5),
    (Plan::RegularDividend, "🏦 REGULAR DIVIDEND PLANS", 5),
];

fn scheme_name(fund: &Value) -> Result<&str, FormatError> {
    match fund.get("schemeName") {
        None => Ok(""),
        Some(Value::String(s)) => Ok(s),
        Some(other) => Err(FormatError::shape("schemeName", "a string", other)),
    }
}

/// First two words of the scheme name.
fn fund_house(name: &str) -> String {
    name.split_whitespace().take(2).collect::<Vec<_>>().join(" ")
}

fn fund_entry(report: &mut Report, fund: &Value, name: &str, plan: Plan, index: usize) {
    report.line(format!("{}. {} - {}", index, fund_house(name), plan.label()));
    report.line(format!("   Full Name: {}", clip(name, 80)));
    report.line(format!("   ISIN: {}", field(fund, "isin")));
    report.line(format!("   Scheme Type: {}", field(fund, "schemeType")));
    report.line(format!("   Category ID: {}", field(fund, "categoryId")));
    report.rule("   ", 50);
}

pub(super) fn render(data: &Value, query: &str) -> FormatResult {
    let mut report = Report::new();
    report.banner(&format!("💰 MUTUAL FUND SEARCH RESULTS: '{}'", query.to_uppercase()));

    if let Some(funds) = data.as_array() {
        let mut grouped: Vec<(Plan, &Value, &str)> = Vec::new();
        for fund in funds.iter().filter(|f| f.is_object()) {
            let name = scheme_name(fund)?;
            grouped.push((Plan::of(name), fund, name));
        }
        let count = |plan: Plan| grouped.iter().filter(|(p, _, _)| *p == plan).count();

        for (plan, heading, cap) in SECTIONS {
            let members: Vec<_> = grouped.iter().filter(|(p, _, _)| *p == plan).take(cap).collect();
            if members.is_empty() {
                continue;
            }
            report.section(heading);
            for (i, (_, fund, name)) in members.into_iter().enumerate() {
                fund_entry(&mut report, fund, name, plan, i + 1);
            }
            report.blank();
        }

        report.section("📊 SEARCH SUMMARY");
        report.line(format!("Total Funds Found: {}", funds.len()));
        report.line(format!("Direct Growth Plans: {}", count(Plan::DirectGrowth)));
        report.line(format!("Regular Growth Plans: {}", count(Plan::RegularGrowth)));
        report.line(format!("Direct Dividend Plans: {}", count(Plan::DirectDividend)));
        report.line(format!("Regular Dividend Plans: {}", count(Plan::RegularDividend)));
        report.line(format!("Other Plans: {}", count(Plan::Other)));

        report.blank().section("💡 INVESTMENT TIP");
        report.line("Direct Growth plans typically offer better returns due to lower expense ratios.");
        report.line("Consider Direct plans if you don't need distributor services.");
    }

    Ok(report.close())
}

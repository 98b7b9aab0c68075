//! Text reports for market-data responses.
//!
//! Each endpoint has a `render` that may fail with a [`FormatError`] when the
//! payload has an unexpected shape; [`format`] never fails and turns such
//! errors into an `Error parsing <label> data: ...` line.

mod high_low;
mod historical;
mod industry;
mod mutual_fund;
pub mod report;
mod stock;
mod target_price;
mod trending;

use serde_json::Value;
use thiserror::Error;

use super::endpoint::{Endpoint, MarketRequest};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FormatError {
    #[error("'{field}' should be {expected}, got {found}")]
    Shape {
        field: String,
        expected: &'static str,
        found: &'static str,
    },
}

impl FormatError {
    pub(crate) fn shape(field: impl Into<String>, expected: &'static str, found: &Value) -> Self {
        FormatError::Shape {
            field: field.into(),
            expected,
            found: report::kind(found),
        }
    }
}

pub type FormatResult = std::result::Result<String, FormatError>;

/// Render a response as a report for the model or the terminal.
pub fn format(request: &MarketRequest, data: &Value) -> String {
    let rendered = match request.endpoint {
        Endpoint::Stock => stock::render(data, &request.symbol()),
        Endpoint::IndustrySearch => industry::render(data, request.subject()),
        Endpoint::MutualFundSearch => mutual_fund::render(data, request.subject()),
        Endpoint::TargetPrice => target_price::render(data, request.subject()),
        Endpoint::Trending => trending::render(data),
        Endpoint::WeekHighLow => high_low::render(data),
        Endpoint::Historical => historical::render(data, &request.symbol(), request.period()),
    };
    rendered.unwrap_or_else(|e| format!("Error parsing {} data: {}", request.endpoint.label(), e))
}

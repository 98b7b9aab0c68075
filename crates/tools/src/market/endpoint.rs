use dalal_core::{Error, Result};
use serde_json::{json, Value};

use super::dispatcher::FetchError;

/// One read-only data category of the market-data API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Stock,
    IndustrySearch,
    MutualFundSearch,
    TargetPrice,
    Trending,
    WeekHighLow,
    Historical,
}

impl Endpoint {
    pub const ALL: [Endpoint; 7] = [
        Endpoint::Stock,
        Endpoint::IndustrySearch,
        Endpoint::MutualFundSearch,
        Endpoint::TargetPrice,
        Endpoint::Trending,
        Endpoint::WeekHighLow,
        Endpoint::Historical,
    ];

    /// URL path segment on the provider.
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::Stock => "stock",
            Endpoint::IndustrySearch => "industry_search",
            Endpoint::MutualFundSearch => "mutual_fund_search",
            Endpoint::TargetPrice => "stock_target_price",
            Endpoint::Trending => "trending",
            Endpoint::WeekHighLow => "fetch_52_week_high_low_data",
            Endpoint::Historical => "historical_data",
        }
    }

    pub fn from_path(path: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|e| e.path() == path.trim_start_matches('/'))
    }

    pub fn tool_name(&self) -> &'static str {
        match self {
            Endpoint::Stock => "get_stock_details",
            Endpoint::IndustrySearch => "get_industry_search",
            Endpoint::MutualFundSearch => "get_mutual_fund_search",
            Endpoint::TargetPrice => "get_stock_target_price",
            Endpoint::Trending => "get_trending_stocks",
            Endpoint::WeekHighLow => "get_52_week_high_low",
            Endpoint::Historical => "get_historical_data",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Endpoint::Stock => "Get comprehensive details for an Indian stock: company overview, BSE/NSE prices, 52-week range, moving averages, key executives, peer comparison and financial highlights. Argument: NSE symbol such as RELIANCE, TCS, INFY.",
            Endpoint::IndustrySearch => "Search Indian stocks by industry (e.g. Banking, IT, Pharma). Results are grouped into bullish, neutral and bearish recommendations with summary statistics.",
            Endpoint::MutualFundSearch => "Search Indian mutual funds by fund house or type (e.g. SBI, HDFC, Equity, Debt). Results are grouped by direct/regular growth and dividend plans.",
            Endpoint::TargetPrice => "Get analyst target prices and rating for a stock by its stock ID.",
            Endpoint::Trending => "List the currently trending stocks on Indian exchanges.",
            Endpoint::WeekHighLow => "List stocks trading at their 52-week highs and lows.",
            Endpoint::Historical => "Get recent historical OHLC prices and volume for a stock over a period such as 1Y, 6M, 3M or 1M.",
        }
    }

    /// JSON schema of the tool arguments.
    pub fn parameters(&self) -> Value {
        let string = |desc: &str| json!({"type": "string", "description": desc});
        match self {
            Endpoint::Stock => json!({
                "type": "object",
                "properties": { "symbol": string("Stock symbol, e.g. RELIANCE, TCS, INFY") },
                "required": ["symbol"]
            }),
            Endpoint::IndustrySearch => json!({
                "type": "object",
                "properties": { "query": string("Industry name, e.g. Banking, IT, Pharma") },
                "required": ["query"]
            }),
            Endpoint::MutualFundSearch => json!({
                "type": "object",
                "properties": { "query": string("Fund name or type, e.g. Equity, Debt, SBI, HDFC") },
                "required": ["query"]
            }),
            Endpoint::TargetPrice => json!({
                "type": "object",
                "properties": { "stock_id": string("Stock ID") },
                "required": ["stock_id"]
            }),
            Endpoint::Trending | Endpoint::WeekHighLow => json!({
                "type": "object",
                "properties": {}
            }),
            Endpoint::Historical => json!({
                "type": "object",
                "properties": {
                    "symbol": string("Stock symbol, e.g. RELIANCE, TCS"),
                    "period": string("Time period: 1Y, 6M, 3M or 1M (default 1Y)")
                },
                "required": ["symbol"]
            }),
        }
    }

    /// Argument the tool requires, if any.
    fn subject_param(&self) -> Option<&'static str> {
        match self {
            Endpoint::Stock | Endpoint::Historical => Some("symbol"),
            Endpoint::IndustrySearch | Endpoint::MutualFundSearch => Some("query"),
            Endpoint::TargetPrice => Some("stock_id"),
            Endpoint::Trending | Endpoint::WeekHighLow => None,
        }
    }

    /// Name used in "Error parsing <label> data" messages.
    pub fn label(&self) -> &'static str {
        match self {
            Endpoint::Stock => "stock",
            Endpoint::IndustrySearch => "industry",
            Endpoint::MutualFundSearch => "mutual fund",
            Endpoint::TargetPrice => "target price",
            Endpoint::Trending => "trending stocks",
            Endpoint::WeekHighLow => "52-week high/low",
            Endpoint::Historical => "historical",
        }
    }

    /// File name prefix used by response snapshots.
    pub fn snapshot_label(&self) -> &'static str {
        match self {
            Endpoint::Stock => "stock_details",
            Endpoint::IndustrySearch => "industry_search",
            Endpoint::MutualFundSearch => "mutual_fund_search",
            Endpoint::TargetPrice => "stock_target_price",
            Endpoint::Trending => "trending_stocks",
            Endpoint::WeekHighLow => "52_week_high_low",
            Endpoint::Historical => "historical_data",
        }
    }
}

pub const DEFAULT_PERIOD: &str = "1Y";

/// A validated call against one endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketRequest {
    pub endpoint: Endpoint,
    /// Symbol, search query or stock id as the caller gave it.
    pub subject: Option<String>,
    pub period: Option<String>,
}

impl MarketRequest {
    pub fn new(endpoint: Endpoint, subject: Option<&str>) -> Self {
        let period = (endpoint == Endpoint::Historical).then(|| DEFAULT_PERIOD.to_string());
        Self {
            endpoint,
            subject: subject.map(|s| s.to_string()),
            period,
        }
    }

    pub fn with_period(mut self, period: &str) -> Self {
        self.period = Some(period.to_string());
        self
    }

    /// Build from tool-call arguments. Missing or blank required arguments are a validation error.
    pub fn from_params(endpoint: Endpoint, params: &Value) -> Result<Self> {
        let subject = match endpoint.subject_param() {
            Some(name) => {
                let value = params
                    .get(name)
                    .and_then(|v| match v {
                        Value::String(s) => Some(s.trim().to_string()),
                        Value::Number(n) => Some(n.to_string()),
                        _ => None,
                    })
                    .filter(|s| !s.is_empty())
                    .ok_or_else(|| {
                        Error::Validation(format!("Missing required parameter: {}", name))
                    })?;
                Some(value)
            }
            None => None,
        };

        let mut request = Self::new(endpoint, subject.as_deref());
        if endpoint == Endpoint::Historical {
            if let Some(period) = params
                .get("period")
                .and_then(|v| v.as_str())
                .map(str::trim)
                .filter(|p| !p.is_empty())
            {
                request.period = Some(period.to_string());
            }
        }
        Ok(request)
    }

    pub fn subject(&self) -> &str {
        self.subject.as_deref().unwrap_or_default()
    }

    /// Upper-cased subject, used for ticker symbols.
    pub fn symbol(&self) -> String {
        self.subject().to_uppercase()
    }

    pub fn period(&self) -> &str {
        self.period.as_deref().unwrap_or(DEFAULT_PERIOD)
    }

    /// Query parameters in the order the provider expects them.
    pub fn query_params(&self) -> Vec<(String, String)> {
        let pair = |k: &str, v: String| (k.to_string(), v);
        match self.endpoint {
            Endpoint::Stock => vec![pair("name", self.symbol())],
            Endpoint::IndustrySearch | Endpoint::MutualFundSearch => {
                vec![pair("query", self.subject().to_string())]
            }
            Endpoint::TargetPrice => vec![pair("stock_id", self.subject().to_string())],
            Endpoint::Trending | Endpoint::WeekHighLow => vec![],
            Endpoint::Historical => vec![
                pair("stock_name", self.symbol()),
                pair("period", self.period().to_string()),
            ],
        }
    }

    pub fn fetch_error_message(&self, err: &FetchError) -> String {
        match self.endpoint {
            Endpoint::Stock => format!("Error fetching stock data for {}: {}", self.subject(), err),
            Endpoint::IndustrySearch => {
                format!("Error fetching industry data for {}: {}", self.subject(), err)
            }
            Endpoint::MutualFundSearch => {
                format!("Error fetching mutual fund data for {}: {}", self.subject(), err)
            }
            Endpoint::TargetPrice => format!(
                "Error fetching target price for stock ID {}: {}",
                self.subject(),
                err
            ),
            Endpoint::Trending => format!("Error fetching trending stocks: {}", err),
            Endpoint::WeekHighLow => format!("Error fetching 52-week high/low data: {}", err),
            Endpoint::Historical => {
                format!("Error fetching historical data for {}: {}", self.subject(), err)
            }
        }
    }

    pub fn empty_message(&self) -> String {
        match self.endpoint {
            Endpoint::Stock => format!("No stock data found for {}", self.symbol()),
            Endpoint::IndustrySearch => format!("No industry data found for {}", self.subject()),
            Endpoint::MutualFundSearch => {
                format!("No mutual fund data found for {}", self.subject())
            }
            Endpoint::TargetPrice => {
                format!("No target price data found for stock ID {}", self.subject())
            }
            Endpoint::Trending => "No trending stocks data found".to_string(),
            Endpoint::WeekHighLow => "No 52-week high/low data found".to_string(),
            Endpoint::Historical => format!("No historical data found for {}", self.symbol()),
        }
    }
}

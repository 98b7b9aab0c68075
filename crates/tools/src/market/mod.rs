//! Market-data access: the request dispatcher, endpoint descriptors, text
//! formatters and the callable tools built on top of them.

pub mod dispatcher;
pub mod endpoint;
pub mod format;

use async_trait::async_trait;
use dalal_core::Result;
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};

use crate::{Tool, ToolContext, ToolSchema};
use dispatcher::MarketData;
pub use endpoint::{Endpoint, MarketRequest};

/// Any falsy body counts as "no data": `null`, `false`, `0`, `""`, `[]` and `{}`.
pub fn is_empty_payload(value: &Value) -> bool {
    !format::report::is_truthy(Some(value))
}

/// Fetch and format one request. Every failure comes back as text.
pub async fn run(market: &dyn MarketData, request: &MarketRequest) -> String {
    let endpoint = request.endpoint.path();
    info!(endpoint, subject = request.subject(), "Market data lookup");

    match market.fetch(endpoint, &request.query_params()).await {
        Err(e) => {
            warn!(endpoint, error = %e, "Market data fetch failed");
            request.fetch_error_message(&e)
        }
        Ok(data) if is_empty_payload(&data) => request.empty_message(),
        Ok(data) => format::format(request, &data),
    }
}

/// Callable tool over one market-data endpoint.
pub struct MarketTool {
    endpoint: Endpoint,
}

impl MarketTool {
    pub fn new(endpoint: Endpoint) -> Self {
        Self { endpoint }
    }

    /// One tool per endpoint.
    pub fn all() -> Vec<Arc<dyn Tool>> {
        Endpoint::ALL
            .into_iter()
            .map(|e| Arc::new(MarketTool::new(e)) as Arc<dyn Tool>)
            .collect()
    }
}

#[async_trait]
impl Tool for MarketTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: self.endpoint.tool_name(),
            description: self.endpoint.description(),
            parameters: self.endpoint.parameters(),
        }
    }

    fn validate(&self, params: &Value) -> Result<()> {
        MarketRequest::from_params(self.endpoint, params).map(|_| ())
    }

    async fn execute(&self, ctx: ToolContext, params: Value) -> Result<Value> {
        let request = MarketRequest::from_params(self.endpoint, &params)?;
        let report = run(ctx.market.as_ref(), &request).await;
        Ok(Value::String(report))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FetchError;
    use dalal_core::Config;
    use serde_json::json;
    use std::sync::Mutex;

    /// Returns a canned response and records every call.
    struct Canned {
        response: std::result::Result<Value, FetchError>,
        calls: Mutex<Vec<(String, Vec<(String, String)>)>>,
    }

    impl Canned {
        fn new(response: std::result::Result<Value, FetchError>) -> Arc<Self> {
            Arc::new(Self {
                response,
                calls: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl MarketData for Canned {
        async fn fetch(
            &self,
            endpoint: &str,
            params: &[(String, String)],
        ) -> std::result::Result<Value, FetchError> {
            self.calls
                .lock()
                .unwrap()
                .push((endpoint.to_string(), params.to_vec()));
            self.response.clone()
        }
    }

    fn ctx(market: Arc<Canned>) -> ToolContext {
        ToolContext::new(Config::default(), market)
    }

    #[test]
    fn test_empty_payloads() {
        assert!(is_empty_payload(&json!(null)));
        assert!(is_empty_payload(&json!({})));
        assert!(is_empty_payload(&json!([])));
        assert!(is_empty_payload(&json!("")));
        assert!(is_empty_payload(&json!(false)));
        assert!(is_empty_payload(&json!(0)));
        assert!(is_empty_payload(&json!(0.0)));
        assert!(!is_empty_payload(&json!([0])));
        assert!(!is_empty_payload(&json!("x")));
        assert!(!is_empty_payload(&json!(1)));
    }

    #[tokio::test]
    async fn test_blank_string_body_is_no_data() {
        let market = Canned::new(Ok(json!("")));
        let out = MarketTool::new(Endpoint::Trending)
            .execute(ctx(market), json!({}))
            .await
            .unwrap();
        assert_eq!(out.as_str().unwrap(), "No trending stocks data found");
    }

    #[test]
    fn test_schemas_cover_every_endpoint() {
        let names: Vec<&str> = MarketTool::all().iter().map(|t| t.schema().name).collect();
        assert_eq!(names.len(), 7);
        assert!(names.contains(&"get_stock_details"));
        assert!(names.contains(&"get_52_week_high_low"));
        assert!(names.contains(&"get_historical_data"));
    }

    #[tokio::test]
    async fn test_execute_requests_upper_cased_symbol() {
        let market = Canned::new(Ok(json!([{"date": "2024-05-02", "close": 2950}])));
        let tool = MarketTool::new(Endpoint::Historical);
        let out = tool
            .execute(ctx(market.clone()), json!({"symbol": "reliance", "period": "6M"}))
            .await
            .unwrap();

        let calls = market.calls.lock().unwrap();
        assert_eq!(calls[0].0, "historical_data");
        assert_eq!(
            calls[0].1,
            vec![
                ("stock_name".to_string(), "RELIANCE".to_string()),
                ("period".to_string(), "6M".to_string())
            ]
        );
        assert!(out.as_str().unwrap().starts_with("Historical Data for RELIANCE (6M):"));
    }

    #[tokio::test]
    async fn test_fetch_error_becomes_message() {
        let market = Canned::new(Err(FetchError::Transport("connection refused".into())));
        let out = MarketTool::new(Endpoint::Stock)
            .execute(ctx(market), json!({"symbol": "tcs"}))
            .await
            .unwrap();
        assert_eq!(
            out.as_str().unwrap(),
            "Error fetching stock data for tcs: request failed: connection refused"
        );
    }

    #[tokio::test]
    async fn test_empty_payload_message() {
        let market = Canned::new(Ok(json!([])));
        let out = MarketTool::new(Endpoint::MutualFundSearch)
            .execute(ctx(market), json!({"query": "Gilt"}))
            .await
            .unwrap();
        assert_eq!(out.as_str().unwrap(), "No mutual fund data found for Gilt");
    }

    #[tokio::test]
    async fn test_missing_argument_is_error() {
        let market = Canned::new(Ok(json!({})));
        let result = MarketTool::new(Endpoint::TargetPrice)
            .execute(ctx(market.clone()), json!({}))
            .await;
        assert!(result.is_err());
        assert!(market.calls.lock().unwrap().is_empty());
    }
}

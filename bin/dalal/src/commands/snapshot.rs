//! Raw response capture for every endpoint, used to build formatter fixtures.

use dalal_core::Paths;
use dalal_tools::market::{Endpoint, MarketRequest};
use dalal_tools::{MarketClient, MarketData};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

const PAUSE: Duration = Duration::from_secs(1);

/// One call in the fixed sample set.
pub(crate) struct Sample {
    pub request: MarketRequest,
    /// Key/value pairs that name the output file.
    pub tags: Vec<(String, String)>,
}

impl Sample {
    fn new(endpoint: Endpoint, subject: Option<&str>, tag: &str) -> Self {
        let tags = subject
            .map(|s| vec![(tag.to_string(), s.to_string())])
            .unwrap_or_default();
        Self {
            request: MarketRequest::new(endpoint, subject),
            tags,
        }
    }

    fn historical(symbol: &str, period: &str) -> Self {
        Self {
            request: MarketRequest::new(Endpoint::Historical, Some(symbol)).with_period(period),
            tags: vec![
                ("symbol".to_string(), symbol.to_string()),
                ("period".to_string(), period.to_string()),
            ],
        }
    }

    pub fn file_name(&self) -> String {
        file_name(self.request.endpoint.snapshot_label(), &self.tags)
    }
}

pub(crate) fn samples() -> Vec<Sample> {
    let mut out = Vec::new();
    for symbol in ["RELIANCE", "TCS", "INFY", "HDFC", "ITC"] {
        out.push(Sample::new(Endpoint::Stock, Some(symbol), "symbol"));
    }
    for industry in ["Banking", "IT", "Pharma", "Auto", "Steel"] {
        out.push(Sample::new(Endpoint::IndustrySearch, Some(industry), "query"));
    }
    for fund in ["HDFC", "SBI", "ICICI", "Axis", "Equity"] {
        out.push(Sample::new(Endpoint::MutualFundSearch, Some(fund), "query"));
    }
    for id in ["1", "2", "3", "RELIANCE", "TCS"] {
        out.push(Sample::new(Endpoint::TargetPrice, Some(id), "stock_id"));
    }
    out.push(Sample::new(Endpoint::Trending, None, ""));
    out.push(Sample::new(Endpoint::WeekHighLow, None, ""));
    for (symbol, period) in [("RELIANCE", "1Y"), ("TCS", "6M"), ("INFY", "3M"), ("HDFC", "1M")] {
        out.push(Sample::historical(symbol, period));
    }
    out
}

fn sanitize(part: &str) -> String {
    part.chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') { c } else { '_' })
        .collect()
}

/// `<label>.json` or `<label>_<k>-<v>_<k>-<v>.json`.
pub(crate) fn file_name(label: &str, tags: &[(String, String)]) -> String {
    if tags.is_empty() {
        return format!("{}.json", label);
    }
    let parts: Vec<String> = tags
        .iter()
        .map(|(k, v)| format!("{}-{}", sanitize(k), sanitize(v)))
        .collect();
    format!("{}_{}.json", label, parts.join("_"))
}

/// Fetch once and write the payload, or `{"error": ...}`, as pretty JSON.
pub(crate) async fn save(
    market: &dyn MarketData,
    endpoint: &str,
    params: &[(String, String)],
    path: &Path,
) -> anyhow::Result<Value> {
    let data = match market.fetch(endpoint, params).await {
        Ok(value) => value,
        Err(e) => {
            warn!(endpoint, error = %e, "Snapshot fetch failed");
            json!({ "error": e.to_string() })
        }
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, serde_json::to_string_pretty(&data)?)?;
    info!(path = %path.display(), "Saved response");
    Ok(data)
}

pub(crate) async fn collect(
    market: &dyn MarketData,
    dir: &Path,
    pause: Duration,
) -> anyhow::Result<Vec<PathBuf>> {
    let mut written = Vec::new();
    for (i, sample) in samples().iter().enumerate() {
        if i > 0 && !pause.is_zero() {
            tokio::time::sleep(pause).await;
        }
        let path = dir.join(sample.file_name());
        println!("🔍 {} -> {}", sample.request.endpoint.label(), path.display());
        save(
            market,
            sample.request.endpoint.path(),
            &sample.request.query_params(),
            &path,
        )
        .await?;
        written.push(path);
    }
    Ok(written)
}

pub async fn run(out: Option<PathBuf>) -> anyhow::Result<()> {
    let paths = Paths::new();
    let config = super::load_config(&paths)?;
    let dir = out.unwrap_or_else(|| paths.snapshots_dir());
    let client = MarketClient::from_config(&config.market);

    println!("🚀 Collecting API responses from {}", client.base_url());
    println!("⏰ Started at: {}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S"));

    let written = collect(&client, &dir, PAUSE).await?;

    println!();
    println!("✅ Saved {} responses to {}", written.len(), dir.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use dalal_tools::FetchError;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        calls: Mutex<Vec<(String, Vec<(String, String)>)>>,
    }

    #[async_trait]
    impl MarketData for Recorder {
        async fn fetch(&self, endpoint: &str, params: &[(String, String)]) -> Result<Value, FetchError> {
            self.calls.lock().unwrap().push((endpoint.to_string(), params.to_vec()));
            if endpoint == "trending" {
                return Err(FetchError::Provider("rate limited".to_string()));
            }
            Ok(json!({ "endpoint": endpoint }))
        }
    }

    #[test]
    fn test_file_names() {
        assert_eq!(file_name("trending_stocks", &[]), "trending_stocks.json");
        let tags = vec![
            ("symbol".to_string(), "TCS".to_string()),
            ("period".to_string(), "6M".to_string()),
        ];
        assert_eq!(file_name("historical_data", &tags), "historical_data_symbol-TCS_period-6M.json");
        let tags = vec![("query".to_string(), "Oil & Gas/2".to_string())];
        assert_eq!(file_name("industry_search", &tags), "industry_search_query-Oil___Gas_2.json");
    }

    #[test]
    fn test_sample_set() {
        let all = samples();
        assert_eq!(all.len(), 26);
        assert_eq!(all[0].file_name(), "stock_details_symbol-RELIANCE.json");
        assert_eq!(all[15].file_name(), "stock_target_price_stock_id-1.json");
        assert_eq!(all[20].file_name(), "trending_stocks.json");
        assert_eq!(all[21].file_name(), "52_week_high_low.json");
        assert_eq!(all[25].file_name(), "historical_data_symbol-HDFC_period-1M.json");
    }

    #[tokio::test]
    async fn test_collect_writes_pretty_json() {
        let dir = tempfile::tempdir().unwrap();
        let market = Recorder::default();
        let written = collect(&market, dir.path(), Duration::ZERO).await.unwrap();
        assert_eq!(written.len(), 26);

        let calls = market.calls.lock().unwrap();
        assert_eq!(calls[0], ("stock".to_string(), vec![("name".to_string(), "RELIANCE".to_string())]));
        assert_eq!(
            calls[23].1,
            vec![
                ("stock_name".to_string(), "TCS".to_string()),
                ("period".to_string(), "6M".to_string())
            ]
        );

        let raw = std::fs::read_to_string(dir.path().join("industry_search_query-IT.json")).unwrap();
        assert!(raw.contains("\n  \"endpoint\""));

        let raw = std::fs::read_to_string(dir.path().join("trending_stocks.json")).unwrap();
        let saved: Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(saved["error"], "rate limited");
    }
}

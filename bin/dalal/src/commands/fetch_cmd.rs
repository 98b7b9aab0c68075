use dalal_core::Paths;
use dalal_tools::market::Endpoint;
use dalal_tools::{MarketClient, MarketData};
use std::path::PathBuf;

use super::snapshot;

/// `key=value` pairs from the command line.
pub(crate) fn parse_params(raw: &[String]) -> anyhow::Result<Vec<(String, String)>> {
    raw.iter()
        .map(|item| {
            item.split_once('=')
                .filter(|(k, _)| !k.trim().is_empty())
                .map(|(k, v)| (k.trim().to_string(), v.to_string()))
                .ok_or_else(|| anyhow::anyhow!("Expected key=value, got '{}'", item))
        })
        .collect()
}

pub async fn run(endpoint: &str, raw_params: &[String], save: Option<PathBuf>) -> anyhow::Result<()> {
    let endpoint = Endpoint::from_path(endpoint).ok_or_else(|| {
        let known: Vec<&str> = Endpoint::ALL.iter().map(|e| e.path()).collect();
        anyhow::anyhow!("Unknown endpoint '{}'. Known endpoints: {}", endpoint, known.join(", "))
    })?;
    let params = parse_params(raw_params)?;

    let config = super::load_config(&Paths::new())?;
    let client = MarketClient::from_config(&config.market);

    match save {
        Some(dir) => {
            let path = dir.join(snapshot::file_name(endpoint.snapshot_label(), &params));
            let data = snapshot::save(&client, endpoint.path(), &params, &path).await?;
            println!("{}", serde_json::to_string_pretty(&data)?);
            println!("✅ Saved response to: {}", path.display());
        }
        None => {
            let data = client.fetch(endpoint.path(), &params).await?;
            println!("{}", serde_json::to_string_pretty(&data)?);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_params() {
        let raw = vec!["stock_name=TCS".to_string(), "period=6M".to_string(), "q=a=b".to_string()];
        assert_eq!(
            parse_params(&raw).unwrap(),
            vec![
                ("stock_name".to_string(), "TCS".to_string()),
                ("period".to_string(), "6M".to_string()),
                ("q".to_string(), "a=b".to_string()),
            ]
        );
        assert!(parse_params(&["TCS".to_string()]).is_err());
        assert!(parse_params(&["=x".to_string()]).is_err());
    }
}

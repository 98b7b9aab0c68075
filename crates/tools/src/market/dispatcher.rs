use async_trait::async_trait;
use dalal_core::config::MarketConfig;
use reqwest::Client;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::safe_truncate;

/// Failure of a single market-data request.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FetchError {
    /// Connection, TLS, body read, or a non-2xx status without an error payload.
    #[error("request failed: {0}")]
    Transport(String),

    #[error("failed to parse response: {0}")]
    Decode(String),

    /// The provider answered with a JSON object carrying an `error` field.
    #[error("{0}")]
    Provider(String),

    #[error("unexpected error: {0}")]
    Unknown(String),
}

/// Read-only access to the market-data REST API.
#[async_trait]
pub trait MarketData: Send + Sync {
    async fn fetch(&self, endpoint: &str, params: &[(String, String)]) -> Result<Value, FetchError>;
}

/// `/endpoint?k=v&...`, keeping the caller's parameter order.
pub fn build_path(endpoint: &str, params: &[(String, String)]) -> String {
    let mut path = format!("/{}", endpoint.trim_start_matches('/'));
    if !params.is_empty() {
        let query = params
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");
        path.push('?');
        path.push_str(&query);
    }
    path
}

/// reqwest-backed client for `stock.indianapi.in`.
#[derive(Clone)]
pub struct MarketClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl MarketClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    pub fn from_config(config: &MarketConfig) -> Self {
        Self::new(config.api_base.clone(), config.api_key.clone())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

fn provider_error(value: &Value) -> Option<String> {
    let err = value.as_object()?.get("error")?;
    Some(match err {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    })
}

#[async_trait]
impl MarketData for MarketClient {
    async fn fetch(&self, endpoint: &str, params: &[(String, String)]) -> Result<Value, FetchError> {
        let url = format!("{}{}", self.base_url, build_path(endpoint, params));
        debug!(url = %url, "Market data request");

        let request = self
            .http
            .get(&url)
            .header("X-Api-Key", &self.api_key)
            .build()
            .map_err(|e| FetchError::Unknown(e.to_string()))?;

        let response = self
            .http
            .execute(request)
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        match serde_json::from_str::<Value>(&body) {
            Ok(value) => {
                if let Some(message) = provider_error(&value) {
                    warn!(endpoint, status = %status, error = %message, "Market data provider error");
                    return Err(FetchError::Provider(message));
                }
                if !status.is_success() {
                    return Err(FetchError::Transport(format!(
                        "HTTP {}: {}",
                        status,
                        safe_truncate(&body, 200)
                    )));
                }
                Ok(value)
            }
            Err(_) if !status.is_success() => Err(FetchError::Transport(format!(
                "HTTP {}: {}",
                status,
                safe_truncate(&body, 200)
            ))),
            Err(e) => Err(FetchError::Decode(e.to_string())),
        }
    }
}

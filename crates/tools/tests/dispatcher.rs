//! The reqwest dispatcher against a local stand-in for the market-data API.

use axum::extract::Query;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::get;
use axum::{Json, Router};
use dalal_tools::market::{run, Endpoint, MarketRequest};
use dalal_tools::{FetchError, MarketClient, MarketData};
use serde_json::json;
use std::collections::HashMap;

async fn spawn_provider() -> String {
    let app = Router::new()
        .route(
            "/stock",
            get(|headers: HeaderMap, Query(q): Query<HashMap<String, String>>| async move {
                let key = headers
                    .get("x-api-key")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or_default()
                    .to_string();
                Json(json!({
                    "companyName": "Tata Consultancy Services",
                    "seenName": q.get("name"),
                    "seenKey": key
                }))
            }),
        )
        .route(
            "/industry_search",
            get(|Query(q): Query<HashMap<String, String>>| async move {
                Json(json!([{ "commonName": q.get("query") }]))
            }),
        )
        .route("/trending", get(|| async { "<html>not json</html>" }))
        .route(
            "/fetch_52_week_high_low_data",
            get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "upstream down") }),
        )
        .route(
            "/stock_target_price",
            get(|| async {
                (
                    StatusCode::UNAUTHORIZED,
                    Json(json!({ "error": "Invalid API key" })),
                )
            }),
        )
        .route(
            "/historical_data",
            get(|| async { Json(json!({ "error": "Stock not found" })) }),
        );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn params(items: &[(&str, &str)]) -> Vec<(String, String)> {
    items.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

#[tokio::test]
async fn sends_key_header_and_query() {
    let base = spawn_provider().await;
    let client = MarketClient::new(base, "test-key");

    let value = client.fetch("stock", &params(&[("name", "TCS")])).await.unwrap();
    assert_eq!(value["seenName"], "TCS");
    assert_eq!(value["seenKey"], "test-key");
}

#[tokio::test]
async fn query_values_are_encoded() {
    let base = spawn_provider().await;
    let client = MarketClient::new(base, "k");

    let value = client
        .fetch("industry_search", &params(&[("query", "Oil & Gas")]))
        .await
        .unwrap();
    assert_eq!(value[0]["commonName"], "Oil & Gas");
}

#[tokio::test]
async fn invalid_json_is_decode_error() {
    let base = spawn_provider().await;
    let err = MarketClient::new(base, "k").fetch("trending", &[]).await.unwrap_err();
    assert!(matches!(err, FetchError::Decode(_)), "got {:?}", err);
}

#[tokio::test]
async fn non_success_status_is_transport_error() {
    let base = spawn_provider().await;
    let err = MarketClient::new(base, "k")
        .fetch("fetch_52_week_high_low_data", &[])
        .await
        .unwrap_err();
    match err {
        FetchError::Transport(msg) => assert!(msg.contains("503"), "{}", msg),
        other => panic!("expected transport error, got {:?}", other),
    }
}

#[tokio::test]
async fn error_payload_is_provider_error_regardless_of_status() {
    let base = spawn_provider().await;
    let client = MarketClient::new(base, "k");

    let err = client
        .fetch("stock_target_price", &params(&[("stock_id", "1")]))
        .await
        .unwrap_err();
    assert_eq!(err, FetchError::Provider("Invalid API key".to_string()));

    let err = client
        .fetch("historical_data", &params(&[("stock_name", "NOPE")]))
        .await
        .unwrap_err();
    assert_eq!(err, FetchError::Provider("Stock not found".to_string()));
}

#[tokio::test]
async fn refused_connection_is_transport_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = MarketClient::new(format!("http://{}", addr), "k")
        .fetch("trending", &[])
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::Transport(_)), "got {:?}", err);
}

#[tokio::test]
async fn run_turns_failures_into_text() {
    let base = spawn_provider().await;
    let client = MarketClient::new(base, "k");

    let request = MarketRequest::new(Endpoint::Trending, None);
    let text = run(&client, &request).await;
    assert!(text.starts_with("Error fetching trending stocks: failed to parse response"), "{}", text);

    let request = MarketRequest::new(Endpoint::Stock, Some("tcs"));
    let text = run(&client, &request).await;
    assert!(text.starts_with("📈 COMPREHENSIVE STOCK ANALYSIS: TCS"), "{}", text);
    assert!(text.contains("Company Name: Tata Consultancy Services"));
}

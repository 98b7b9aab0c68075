use axum::extract::State;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use dalal_agent::Pipeline;
use dalal_core::{Config, Paths};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<dyn Pipeline>,
}

#[derive(Debug, Deserialize)]
pub struct StockQuery {
    pub question: String,
}

#[derive(Debug, Serialize)]
pub struct StockResponse {
    pub question: String,
    pub result: String,
    pub status: String,
}

fn detail(status: StatusCode, message: String) -> Response {
    (status, Json(json!({ "detail": message }))).into_response()
}

async fn handle_analyze(State(state): State<AppState>, Json(query): Json<StockQuery>) -> Response {
    if query.question.trim().is_empty() {
        return detail(StatusCode::BAD_REQUEST, "Question cannot be empty".to_string());
    }

    info!(question = %query.question, "Analyzing question");
    match state.pipeline.kickoff(&query.question).await {
        Ok(result) => Json(StockResponse {
            question: query.question,
            result,
            status: "success".to_string(),
        })
        .into_response(),
        Err(e) => {
            error!(error = %e, "Analysis failed");
            detail(StatusCode::INTERNAL_SERVER_ERROR, format!("Analysis failed: {}", e))
        }
    }
}

async fn handle_root() -> impl IntoResponse {
    Json(json!({
        "message": "NSE Stock Market Analysis System",
        "description": "Ask questions about Indian stocks, IPOs, or market data",
        "endpoint": "/analyze-stock/",
        "examples": [
            "Tell me about Reliance stock",
            "LIC IPO performance",
            "Top gainers today",
            "Current price of TCS"
        ]
    }))
}

async fn handle_health() -> impl IntoResponse {
    Json(json!({ "status": "healthy", "service": "NSE Stock Analysis API" }))
}

fn build_cors_layer(config: &Config) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .gateway
        .allowed_origins
        .iter()
        .filter_map(|o| match o.parse::<HeaderValue>() {
            Ok(v) => Some(v),
            Err(_) => {
                warn!(origin = %o, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    if origins.is_empty() {
        CorsLayer::permissive()
    } else {
        CorsLayer::permissive().allow_origin(AllowOrigin::list(origins))
    }
}

pub fn router(state: AppState, config: &Config) -> Router {
    Router::new()
        .route("/", get(handle_root))
        .route("/health", get(handle_health))
        .route("/analyze-stock/", post(handle_analyze))
        .layer(build_cors_layer(config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run(host: Option<String>, port: Option<u16>) -> anyhow::Result<()> {
    let paths = Paths::new();
    let config = super::load_config(&paths)?;
    let pipeline = super::build_pipeline(&config, &paths)?;

    let host = host.unwrap_or_else(|| config.gateway.host.clone());
    let port = port.unwrap_or(config.gateway.port);
    let app = router(AppState { pipeline }, &config);

    let bind_addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!(addr = %bind_addr, model = %config.agents.defaults.model, "REST API listening");
    println!("🚀 dalal API on http://{}  (POST /analyze-stock/)", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    info!("REST API stopped");
    Ok(())
}

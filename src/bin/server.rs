//! HTTP facade for the finance agent: one health route and one chat route
//! wrapping the dispatcher.

use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use dotenv::dotenv;
use finance_agent::{AgentConfig, FinanceAgent};
use log::{error, info};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing_subscriber::EnvFilter;

#[derive(Clone)]
struct AppState {
    agent: Arc<FinanceAgent>,
}

#[derive(Deserialize)]
struct ChatRequest {
    message: String,
}

#[derive(Serialize)]
struct ChatResponse {
    response: String,
}

#[derive(Serialize)]
struct StatusResponse {
    status: String,
    message: String,
}

#[derive(Serialize)]
struct ErrorResponse {
    detail: String,
}

async fn root() -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "ok".to_string(),
        message: "Finance Agent API is running".to_string(),
    })
}

async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, (StatusCode, Json<ErrorResponse>)> {
    info!("Received chat request with message: {}", request.message);
    match state.agent.answer(&request.message).await {
        Ok(response) => Ok(Json(ChatResponse { response })),
        Err(e) => {
            error!("Error processing request: {}", e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    detail: e.to_string(),
                }),
            ))
        }
    }
}

#[tokio::main]
async fn main() {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if let Err(e) = run().await {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> finance_agent::Result<()> {
    let config = AgentConfig::from_env()?;
    let agent = FinanceAgent::from_config(config).await?;

    let state = AppState {
        agent: Arc::new(agent),
    };

    let app = Router::new()
        .route("/", get(root))
        .route("/api/chat", post(chat))
        .layer(CorsLayer::permissive())
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("0.0.0.0:8000").await?;
    info!("Starting Finance Agent API server on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}

pub mod api;
pub mod bridge;
pub mod client;
pub mod config;

use std::path::PathBuf;

use axum::Router;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

pub use api::{ErrorResponse, QueryRequest, QueryResponse, QUERY_PATH};
pub use bridge::{BridgeConfig, BridgeError};
pub use client::{
    api_base, query_url, HttpTransport, QueryError, QueryForm, QueryTransport, QueryView,
    Submission, LOCAL_DEV_ORIGIN, PENDING_TEXT, REQUEST_FAILED,
};
pub use config::AppConfig;

#[derive(Debug, Clone)]
pub struct AppState {
    pub bridge: BridgeConfig,
    pub static_dir: Option<PathBuf>,
}

impl AppState {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            bridge: BridgeConfig::new(config.agent_cmd.clone(), config.timeout_ms),
            static_dir: config.static_dir.clone(),
        }
    }
}

pub fn build_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    api::router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

pub async fn run_server(app: Router, port: u16) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    info!("listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}

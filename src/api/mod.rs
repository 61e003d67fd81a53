mod handlers;
mod models;

use axum::{routing::post, Router};
use tower_http::services::ServeDir;

use crate::AppState;

pub use handlers::{not_found, query};
pub use models::{ErrorResponse, QueryRequest, QueryResponse};

pub const QUERY_PATH: &str = "/api/query";

pub fn router(state: AppState) -> Router {
    let api = Router::new().route(QUERY_PATH, post(query));

    // Static front-end takes the fallback when configured; otherwise JSON 404.
    let api = match state.static_dir.clone() {
        Some(dir) => api.fallback_service(ServeDir::new(dir).append_index_html_on_directories(true)),
        None => api.fallback(not_found),
    };

    api.with_state(state)
}

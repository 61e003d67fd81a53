use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::{info, warn};

use crate::bridge::run_agent;
use crate::AppState;

use super::models::{ErrorResponse, QueryRequest, QueryResponse};

pub async fn query(
    State(state): State<AppState>,
    Json(payload): Json<QueryRequest>,
) -> Result<Json<QueryResponse>, (StatusCode, Json<ErrorResponse>)> {
    let prompt = payload.prompt.trim();
    if prompt.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new("Prompt is required")),
        ));
    }

    info!(prompt_len = prompt.len(), "query received");
    match run_agent(prompt, &state.bridge).await {
        Ok(output) => Ok(Json(QueryResponse { output })),
        Err(err) => {
            warn!(error = %err, "agent failed");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new(err.to_string())),
            ))
        }
    }
}

pub async fn not_found() -> Response {
    (StatusCode::NOT_FOUND, Json(ErrorResponse::new("Not Found"))).into_response()
}
